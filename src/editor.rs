use std::rc::Rc;

use crate::sprite::SpriteResource;

/// Capabilities offered by an attached level editor. Actors only expose editable
/// property descriptors when one is passed in.
pub trait EditorHost {
    fn sprite_canonical_name(&self, sprite: &SpriteResource) -> String;
    fn sprite_options(&self) -> Vec<String>;
    fn sprite_for_name(&self, name: &str) -> Option<Rc<SpriteResource>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEditor {
    Multi { options: Vec<String> },
    Toggle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: &'static str,
    pub value: String,
    pub editor: Option<PropertyEditor>,
}

impl Property {
    pub fn read_only(name: &'static str, value: impl Into<String>) -> Self {
        Self { name, value: value.into(), editor: None }
    }

    pub fn editable(&self) -> bool {
        self.editor.is_some()
    }
}
