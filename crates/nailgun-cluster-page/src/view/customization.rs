/*
[INPUT]:  Cluster `is_customized` flag
[OUTPUT]: Customization warning banner
[POS]:    View - cluster page banner
[UPDATE]: When the customization notice changes
*/

use crate::events::{Binding, ClusterAttribute, Topic, ViewAction, ViewSlot};
use crate::model::ClusterModel;

pub const CUSTOMIZATION_MESSAGE: &str =
    "Some environment settings were changed outside of the dashboard; they are not displayed here.";

#[derive(Debug, Default)]
pub struct CustomizationMessageView {
    message: Option<&'static str>,
    render_count: usize,
}

impl CustomizationMessageView {
    pub fn bindings() -> Vec<Binding> {
        vec![Binding::new(
            Topic::Cluster(ClusterAttribute::IsCustomized),
            ViewSlot::CustomizationMessage,
            ViewAction::Render,
        )]
    }

    pub fn render(&mut self, model: &ClusterModel) {
        self.message = model.cluster().is_customized.then_some(CUSTOMIZATION_MESSAGE);
        self.render_count += 1;
    }

    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }
}
