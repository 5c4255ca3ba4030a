use collapse_core::CollapseConfig;
use yew::prelude::*;

/// One header/content pair rendered by [`CollapseGroup`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CollapseItem {
    pub title: AttrValue,
    pub body: AttrValue,
    pub open: bool,
}

impl CollapseItem {
    pub fn new(title: impl Into<AttrValue>, body: impl Into<AttrValue>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            open: false,
        }
    }

    #[must_use]
    pub const fn opened(mut self) -> Self {
        self.open = true;
        self
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct CollapseGroupProps {
    /// Container id; required for `persist`.
    pub id: AttrValue,
    pub items: Vec<CollapseItem>,
    #[prop_or_default]
    pub accordion: bool,
    #[prop_or_default]
    pub persist: bool,
    #[prop_or_default]
    pub class: Classes,
}

impl CollapseGroupProps {
    #[must_use]
    pub fn config(&self) -> CollapseConfig {
        CollapseConfig {
            accordion: self.accordion,
            ..CollapseConfig::default()
        }
        .with_persist(self.persist)
    }
}

/// Header/content pairs bound to a collapse controller once mounted.
#[function_component(CollapseGroup)]
pub fn collapse_group(props: &CollapseGroupProps) -> Html {
    let container = use_node_ref();
    #[cfg(target_arch = "wasm32")]
    {
        let container = container.clone();
        let config = props.config();
        use_effect_with((), move |()| {
            let element = container.cast::<web_sys::Element>();
            if let Some(element) = &element {
                crate::binding::bind(element, config, collapse_core::RevealStrategy::DefaultToggle);
            }
            move || {
                if let Some(element) = element {
                    crate::binding::unbind(&element);
                }
            }
        });
    }

    let class = classes!("collapse-group", props.class.clone());
    html! {
        <div id={props.id.clone()} class={class} ref={container}>
            { for props.items.iter().map(|item| html! {
                <>
                    <h3 class={classes!(item.open.then_some("open"))}>
                        <a href="#">{ item.title.clone() }</a>
                    </h3>
                    <div class="collapse-group__body">{ item.body.clone() }</div>
                </>
            }) }
        </div>
    }
}
