//! Inline editing of the user's profile fields.

use std::path::{Path, PathBuf};

use crate::api::models::ProfileField;

/// A field change to persist with `PUT /api/setup/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub field: ProfileField,
    pub value: String,
}

impl ProfileUpdate {
    pub fn failure_text(&self) -> String {
        format!("Failed to update {}", self.field.as_str())
    }
}

#[derive(Debug, Default, Clone)]
struct FieldEditor {
    display: String,
    input: String,
    editing: bool,
}

#[derive(Debug, Default)]
pub struct ProfileEditor {
    name: FieldEditor,
    about: FieldEditor,
    picture: Option<PathBuf>,
}

impl ProfileEditor {
    pub fn new(name: &str, about: &str) -> Self {
        let field = |v: &str| FieldEditor { display: v.to_string(), input: v.to_string(), editing: false };
        Self { name: field(name), about: field(about), picture: None }
    }

    fn field(&self, field: ProfileField) -> &FieldEditor {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::About => &self.about,
        }
    }

    fn field_mut(&mut self, field: ProfileField) -> &mut FieldEditor {
        match field {
            ProfileField::Name => &mut self.name,
            ProfileField::About => &mut self.about,
        }
    }

    pub fn display(&self, field: ProfileField) -> &str {
        &self.field(field).display
    }

    pub fn input(&self, field: ProfileField) -> &str {
        &self.field(field).input
    }

    pub fn is_editing(&self, field: ProfileField) -> bool {
        self.field(field).editing
    }

    pub fn set_input(&mut self, field: ProfileField, text: &str) {
        self.field_mut(field).input = text.to_string();
    }

    /// Flip between view and edit mode. Leaving edit mode commits the input
    /// to the display and returns the update to send.
    pub fn toggle_edit(&mut self, field: ProfileField) -> Option<ProfileUpdate> {
        let editor = self.field_mut(field);
        if editor.editing {
            editor.editing = false;
            editor.display = editor.input.clone();
            Some(ProfileUpdate { field, value: editor.input.clone() })
        } else {
            editor.editing = true;
            editor.input = editor.display.clone();
            None
        }
    }

    /// The chosen picture previews immediately, before the upload finishes.
    pub fn choose_picture(&mut self, path: &Path) -> Option<String> {
        self.picture = Some(path.to_path_buf());
        path.file_name().map(|n| n.to_string_lossy().into_owned())
    }

    pub fn picture(&self) -> Option<&Path> {
        self.picture.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_then_commit_returns_update() {
        let mut profile = ProfileEditor::new("Ana", "Hey there!");
        assert_eq!(profile.toggle_edit(ProfileField::Name), None);
        assert!(profile.is_editing(ProfileField::Name));
        profile.set_input(ProfileField::Name, "Ana B");
        assert_eq!(profile.display(ProfileField::Name), "Ana");

        let update = profile.toggle_edit(ProfileField::Name).unwrap();
        assert_eq!(update, ProfileUpdate { field: ProfileField::Name, value: "Ana B".into() });
        assert_eq!(profile.display(ProfileField::Name), "Ana B");
        assert!(!profile.is_editing(ProfileField::Name));
        assert_eq!(update.failure_text(), "Failed to update name");
    }

    #[test]
    fn unchanged_confirm_still_sends() {
        let mut profile = ProfileEditor::new("Ana", "Hey");
        profile.toggle_edit(ProfileField::About);
        let update = profile.toggle_edit(ProfileField::About).unwrap();
        assert_eq!(update.value, "Hey");
    }

    #[test]
    fn fields_edit_independently() {
        let mut profile = ProfileEditor::new("Ana", "Hey");
        profile.toggle_edit(ProfileField::About);
        assert!(!profile.is_editing(ProfileField::Name));
        assert_eq!(profile.input(ProfileField::About), "Hey");
    }

    #[test]
    fn picture_choice_yields_file_name() {
        let mut profile = ProfileEditor::default();
        let name = profile.choose_picture(Path::new("/tmp/cat.png"));
        assert_eq!(name.as_deref(), Some("cat.png"));
        assert_eq!(profile.picture(), Some(Path::new("/tmp/cat.png")));
    }
}
