use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

use crate::components::notification::{Notifier, Severity};
use crate::dom::{self, Listener};
use crate::error::EnhanceError;

const REQUIRED_SELECTOR: &str = "input[required], textarea[required], select[required]";
const INVALID_CLASS: &str = "invalid";
pub const FAILURE_MESSAGE: &str = "Please fill in all required fields before submitting.";

const INVALID_STYLE: [(&str, &str); 2] = [
    ("border", "2px solid #FF004D"),
    ("box-shadow", "0 0 0 3px rgba(255, 0, 77, 0.25)"),
];

pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// The value a radio group submits, given every `(name, checked, value)` radio in the form.
pub fn radio_group_value<'a, I>(name: &str, radios: I) -> String
where
    I: IntoIterator<Item = (&'a str, bool, &'a str)>,
{
    radios
        .into_iter()
        .find(|(other, checked, _)| *checked && *other == name)
        .map(|(_, _, value)| value.to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    invalid: Vec<usize>,
}

impl ValidationReport {
    pub fn check<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let invalid = values
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !is_filled(value.as_ref()))
            .map(|(i, _)| i)
            .collect();
        Self { invalid }
    }

    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    pub fn is_invalid(&self, index: usize) -> bool {
        self.invalid.contains(&index)
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    pub fn first_invalid(&self) -> Option<usize> {
        self.invalid.first().copied()
    }
}

#[derive(Clone)]
pub enum RequiredField {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
    Select(HtmlSelectElement),
}

impl RequiredField {
    fn from_element(el: Element) -> Option<Self> {
        let el = match el.dyn_into::<HtmlInputElement>() {
            Ok(input) => return Some(Self::Input(input)),
            Err(el) => el,
        };
        let el = match el.dyn_into::<HtmlTextAreaElement>() {
            Ok(area) => return Some(Self::TextArea(area)),
            Err(el) => el,
        };
        el.dyn_into::<HtmlSelectElement>().ok().map(Self::Select)
    }

    pub fn value(&self, form: &Element) -> String {
        match self {
            Self::Input(input) if input.type_() == "radio" && !input.name().is_empty() => {
                let radios: Vec<HtmlInputElement> =
                    dom::query_all_in(form, r#"input[type="radio"]"#).unwrap_or_default();
                let states: Vec<(String, bool, String)> = radios
                    .iter()
                    .map(|radio| (radio.name(), radio.checked(), radio.value()))
                    .collect();
                radio_group_value(
                    &input.name(),
                    states
                        .iter()
                        .map(|(name, checked, value)| (name.as_str(), *checked, value.as_str())),
                )
            }
            Self::Input(input) if matches!(input.type_().as_str(), "checkbox" | "radio") => {
                if input.checked() {
                    input.value()
                } else {
                    String::new()
                }
            }
            Self::Input(input) => input.value(),
            Self::TextArea(area) => area.value(),
            Self::Select(select) => select.value(),
        }
    }

    fn element(&self) -> &HtmlElement {
        match self {
            Self::Input(input) => input,
            Self::TextArea(area) => area,
            Self::Select(select) => select,
        }
    }

    fn mark(&self, valid: bool) -> Result<(), EnhanceError> {
        let el = self.element();
        if valid {
            dom::clear_styles(el, &["border", "box-shadow"])?;
            el.class_list().remove_1(INVALID_CLASS)?;
            el.remove_attribute("aria-invalid")?;
        } else {
            dom::set_styles(el, &INVALID_STYLE)?;
            el.class_list().add_1(INVALID_CLASS)?;
            el.set_attribute("aria-invalid", "true")?;
        }
        Ok(())
    }

    fn is_marked_invalid(&self) -> bool {
        self.element().class_list().contains(INVALID_CLASS)
    }

    fn recheck(&self, form: &Element) {
        if let Err(e) = self.mark(is_filled(&self.value(form))) {
            warn!("Failed to style field: {}", e);
        }
    }
}

fn required_fields(form: &Element) -> Result<Vec<RequiredField>, EnhanceError> {
    Ok(dom::query_all_in::<Element>(form, REQUIRED_SELECTOR)?
        .into_iter()
        .filter_map(RequiredField::from_element)
        .collect())
}

pub fn validate(
    form: &Element,
    fields: &[RequiredField],
) -> Result<ValidationReport, EnhanceError> {
    let report = ValidationReport::check(fields.iter().map(|field| field.value(form)));
    for (i, field) in fields.iter().enumerate() {
        field.mark(!report.is_invalid(i))?;
    }
    if let Some(first) = report.first_invalid() {
        fields[first].element().focus()?;
    }
    Ok(report)
}

pub fn install(document: &Document, notifier: Notifier) -> Result<Vec<Listener>, EnhanceError> {
    let forms: Vec<Element> = dom::require_all(document, "form")?;
    let mut listeners = Vec::new();

    for form in forms {
        let scope = form.clone();
        listeners.push(Listener::new(&form, "submit", move |event| {
            let result = required_fields(&scope).and_then(|fields| validate(&scope, &fields));
            match result {
                Ok(report) if report.is_valid() => {}
                Ok(report) => {
                    event.prevent_default();
                    debug!("Blocked submit with {} empty required fields", report.invalid_count());
                    if let Err(e) = notifier.notify(FAILURE_MESSAGE, Severity::Error) {
                        warn!("Could not show validation notice: {}", e);
                    }
                }
                Err(e) => warn!("Form validation skipped: {}", e),
            }
        })?);

        // Live feedback, independent of submitting.
        for field in required_fields(&form)? {
            let target = field.element().clone();
            let on_blur = field.clone();
            let blur_form = form.clone();
            listeners.push(Listener::new(&target, "blur", move |_| {
                on_blur.recheck(&blur_form)
            })?);
            let input_form = form.clone();
            listeners.push(Listener::new(&target, "input", move |_| {
                if field.is_marked_invalid() {
                    field.recheck(&input_form);
                }
            })?);
        }
    }
    Ok(listeners)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_does_not_fill_a_field() {
        assert!(is_filled("Team Rocket"));
        assert!(is_filled("  x "));
        assert!(!is_filled(""));
        assert!(!is_filled(" \t\n"));
    }

    #[test]
    fn exactly_the_empty_fields_are_invalid() {
        let report = ValidationReport::check(["Ada", "", "ada@example.com", "   ", "Hackers"]);
        assert!(!report.is_valid());
        assert_eq!(report.invalid_count(), 2);
        assert!(report.is_invalid(1));
        assert!(report.is_invalid(3));
        assert!(!report.is_invalid(0));
        assert!(!report.is_invalid(4));
    }

    #[test]
    fn first_invalid_follows_dom_order() {
        let report = ValidationReport::check(["filled", "filled", "", "filled", ""]);
        assert_eq!(report.first_invalid(), Some(2));
    }

    #[test]
    fn complete_form_submits() {
        let report = ValidationReport::check(vec!["Ada".to_string(), "4".to_string()]);
        assert!(report.is_valid());
        assert_eq!(report.first_invalid(), None);
        assert!((0..2).all(|i| !report.is_invalid(i)));
    }

    #[test]
    fn radio_group_with_one_choice_is_filled() {
        let radios = [
            ("team_size", false, "2"),
            ("team_size", true, "3"),
            ("track", false, "ai"),
        ];
        let group = radio_group_value("team_size", radios);
        assert_eq!(group, "3");

        // Every required option of the group reports the group's choice.
        let report =
            ValidationReport::check(["Ada", group.as_str(), group.as_str(), group.as_str()]);
        assert!(report.is_valid());
    }

    #[test]
    fn radio_group_without_choice_is_empty() {
        let radios = [("team_size", false, "2"), ("track", true, "ai")];
        let group = radio_group_value("team_size", radios);
        assert_eq!(group, "");
        let report = ValidationReport::check(["Ada", group.as_str(), group.as_str()]);
        assert_eq!(report.invalid_count(), 2);
        assert_eq!(report.first_invalid(), Some(1));
    }

    #[test]
    fn form_without_required_fields_is_valid() {
        let report = ValidationReport::check(Vec::<&str>::new());
        assert!(report.is_valid());
    }
}
