//! The slice of the page document the site behaviors touch.
//!
//! Behaviors only ever go through [`Dom`]. [`StaticPage`] is the in-process
//! implementation, loaded from the page markup and mutated in place.

use crate::error::DomError;
use scraper::{Html, Selector};
use std::collections::HashMap;

pub trait Dom {
    fn class_name(&self, id: &str) -> Result<&str, DomError>;

    fn set_class_name(&mut self, id: &str, class: &str) -> Result<(), DomError>;

    /// Current value of an `<input>` (empty when it has none).
    fn input_value(&self, id: &str) -> Result<&str, DomError>;

    /// Value of the first checked radio button in the group `name`.
    fn checked_value(&self, name: &str) -> Option<&str>;

    fn append_html(&mut self, id: &str, html: &str) -> Result<(), DomError>;
}

#[derive(Debug, Clone, Default)]
struct ElementState {
    class: String,
    value: String,
    appended: Vec<String>,
}

#[derive(Debug, Clone)]
struct Radio {
    name: String,
    value: String,
    checked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StaticPage {
    elements: HashMap<String, ElementState>,
    radios: Vec<Radio>,
    mutated: Vec<String>,
}

impl StaticPage {
    pub fn parse(markup: &str) -> Self {
        let document = Html::parse_document(markup);
        let mut page = Self::default();

        if let Ok(selector) = Selector::parse("[id]") {
            for element in document.select(&selector) {
                let el = element.value();
                let Some(id) = el.attr("id") else { continue };
                // First element wins, like getElementById.
                page.elements
                    .entry(id.to_string())
                    .or_insert_with(|| ElementState {
                        class: el.attr("class").unwrap_or_default().to_string(),
                        value: el.attr("value").unwrap_or_default().to_string(),
                        appended: Vec::new(),
                    });
            }
        }

        if let Ok(selector) = Selector::parse(r#"input[type="radio"]"#) {
            for element in document.select(&selector) {
                let el = element.value();
                let Some(name) = el.attr("name") else { continue };
                page.radios.push(Radio {
                    name: name.to_string(),
                    value: el.attr("value").unwrap_or("on").to_string(),
                    checked: el.attr("checked").is_some(),
                });
            }
        }

        page
    }

    /// Simulates typing into a text input.
    pub fn set_input_value(&mut self, id: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.value = value.to_string();
        Ok(())
    }

    /// Simulates clicking a radio button; unchecks the rest of its group.
    /// Returns false when no radio with that name and value exists.
    pub fn check_radio(&mut self, name: &str, value: &str) -> bool {
        if !self.radios.iter().any(|r| r.name == name && r.value == value) {
            return false;
        }
        for radio in self.radios.iter_mut().filter(|r| r.name == name) {
            radio.checked = radio.value == value;
        }
        true
    }

    pub fn clear_radios(&mut self, name: &str) {
        for radio in self.radios.iter_mut().filter(|r| r.name == name) {
            radio.checked = false;
        }
    }

    /// Everything appended to `id` since load, concatenated.
    pub fn appended_html(&self, id: &str) -> Result<String, DomError> {
        self.element(id).map(|e| e.appended.concat())
    }

    /// Ids written since load, in first-write order.
    pub fn mutated_ids(&self) -> &[String] {
        &self.mutated
    }

    fn element(&self, id: &str) -> Result<&ElementState, DomError> {
        self.elements
            .get(id)
            .ok_or_else(|| DomError::MissingElement(id.to_string()))
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut ElementState, DomError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| DomError::MissingElement(id.to_string()))
    }

    fn mark_mutated(&mut self, id: &str) {
        if !self.mutated.iter().any(|m| m == id) {
            self.mutated.push(id.to_string());
        }
    }
}

impl Dom for StaticPage {
    fn class_name(&self, id: &str) -> Result<&str, DomError> {
        self.element(id).map(|e| e.class.as_str())
    }

    fn set_class_name(&mut self, id: &str, class: &str) -> Result<(), DomError> {
        self.element_mut(id)?.class = class.to_string();
        self.mark_mutated(id);
        Ok(())
    }

    fn input_value(&self, id: &str) -> Result<&str, DomError> {
        self.element(id).map(|e| e.value.as_str())
    }

    fn checked_value(&self, name: &str) -> Option<&str> {
        self.radios
            .iter()
            .find(|r| r.name == name && r.checked)
            .map(|r| r.value.as_str())
    }

    fn append_html(&mut self, id: &str, html: &str) -> Result<(), DomError> {
        self.element_mut(id)?.appended.push(html.to_string());
        self.mark_mutated(id);
        Ok(())
    }
}
