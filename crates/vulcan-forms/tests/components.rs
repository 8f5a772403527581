use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use vulcan_forms::{
    ChangeEvent, FieldError, FormComponentInner, FormComponentProps, FormNestedItem,
    FormNestedItemProps, InputType, MessageCatalog, NestedField,
};

fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Arc<Mutex<Vec<T>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    (calls.clone(), calls)
}

// ─────────────────────────────────────────────────────────────────────────────
// FormComponentInner
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn view_describes_a_plain_text_field() {
    let field = FormComponentInner::new(
        FormComponentProps::new("title", InputType::Text)
            .with_help("Shown in lists")
            .with_loading(true)
            .with_intl_keys(vec!["movies.title".to_string()])
            .with_item_property("layout", json!("horizontal"))
            .with_input_property("placeholder", json!("Title"))
            .with_input_property("submitForm", json!("fn")),
    );

    let view = field.view(&MessageCatalog::english());
    assert_eq!(
        serde_json::to_value(&view).expect("serialize"),
        json!({
            "className": "form-input input-title form-component-text",
            "inputProperties": {"placeholder": "Title"},
            "itemProperties": {
                "layout": "horizontal",
                "description": "Shown in lists",
                "loading": true,
                "intlKeys": ["movies.title"]
            },
            "errors": [],
            "clearButton": null,
            "charsRemaining": null
        })
    );
}

#[test]
fn description_wins_over_help() {
    let field = FormComponentInner::new(
        FormComponentProps::new("title", InputType::Text)
            .with_help("help")
            .with_description("description"),
    );
    let view = field.view(&MessageCatalog::english());
    assert_eq!(view.item_properties.description.as_deref(), Some("description"));
}

#[test]
fn errors_mark_the_wrapper() {
    let error = FieldError::new("errors.required");
    let field = FormComponentInner::new(
        FormComponentProps::new("year", InputType::Number).with_errors(vec![error.clone()]),
    );
    let view = field.view(&MessageCatalog::english());
    assert!(view.class_name.ends_with("input-error"));
    assert_eq!(view.errors, vec![error]);
}

#[test]
fn clearable_inputs_get_a_clear_button_unless_disabled() {
    let catalog = MessageCatalog::english();
    for input in [InputType::Select, InputType::Date, InputType::Datetime, InputType::Time] {
        let view = FormComponentInner::new(FormComponentProps::new("when", input)).view(&catalog);
        let button = view.clear_button.expect("clear button");
        assert_eq!(button.class_name, "form-component-clear");
        assert_eq!(button.title, "Clear field");
    }

    let disabled = FormComponentInner::new(
        FormComponentProps::new("when", InputType::Date).with_disabled(true),
    );
    assert!(disabled.view(&catalog).clear_button.is_none());
    let text = FormComponentInner::new(FormComponentProps::new("title", InputType::Text));
    assert!(text.view(&catalog).clear_button.is_none());
}

#[test]
fn clear_button_title_is_translated() {
    let catalog = MessageCatalog::new().with_message("forms.clear_field", "Effacer");
    let view = FormComponentInner::new(FormComponentProps::new("genre", InputType::Select))
        .view(&catalog);
    assert_eq!(view.clear_button.expect("button").title, "Effacer");
}

#[test]
fn chars_remaining_turns_danger_below_ten() {
    let catalog = MessageCatalog::english();
    let plenty = FormComponentInner::new(
        FormComponentProps::new("bio", InputType::Textarea).with_chars_remaining(10),
    )
    .view(&catalog);
    let counter = plenty.chars_remaining.expect("counter");
    assert_eq!(counter.class_name, "form-control-limit");
    assert_eq!(counter.remaining, 10);

    let few = FormComponentInner::new(
        FormComponentProps::new("bio", InputType::Textarea).with_chars_remaining(9),
    )
    .view(&catalog);
    assert_eq!(
        few.chars_remaining.expect("counter").class_name,
        "form-control-limit danger"
    );
}

#[test]
fn change_forwards_checked_for_checkboxes_and_value_otherwise() {
    let (calls, sink) = recorder::<Value>();
    let checkbox = FormComponentInner::new(FormComponentProps::new("seen", InputType::Checkbox))
        .on_change_with(move |value| sink.lock().expect("lock").push(value));
    checkbox.on_change(&ChangeEvent {
        value: json!("on"),
        checked: true,
    });

    let sink = calls.clone();
    let text = FormComponentInner::new(FormComponentProps::new("title", InputType::Text))
        .on_change_with(move |value| sink.lock().expect("lock").push(value));
    text.on_change(&ChangeEvent {
        value: json!("Alien"),
        checked: false,
    });

    assert_eq!(*calls.lock().expect("lock"), vec![json!(true), json!("Alien")]);
}

#[test]
fn change_without_handler_is_ignored() {
    let field = FormComponentInner::new(FormComponentProps::new("title", InputType::Text));
    field.on_change(&ChangeEvent::default());
}

#[test]
fn enter_submits_except_in_textareas() {
    let (calls, sink) = recorder::<()>();
    let text = FormComponentInner::new(FormComponentProps::new("title", InputType::Text))
        .on_submit_with(move || sink.lock().expect("lock").push(()));
    assert!(!text.on_key_press("a"));
    assert!(text.on_key_press("Enter"));

    let sink = calls.clone();
    let textarea = FormComponentInner::new(FormComponentProps::new("bio", InputType::Textarea))
        .on_submit_with(move || sink.lock().expect("lock").push(()));
    assert!(!textarea.on_key_press("Enter"));

    assert_eq!(calls.lock().expect("lock").len(), 1);
}

#[test]
fn clear_calls_back_for_clearable_inputs_only() {
    let (calls, sink) = recorder::<()>();
    let select = FormComponentInner::new(FormComponentProps::new("genre", InputType::Select))
        .on_clear_with(move || sink.lock().expect("lock").push(()));
    assert!(select.clear());

    let sink = calls.clone();
    let text = FormComponentInner::new(FormComponentProps::new("title", InputType::Text))
        .on_clear_with(move || sink.lock().expect("lock").push(()));
    assert!(!text.clear());

    assert_eq!(calls.lock().expect("lock").len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// FormNestedItem
// ─────────────────────────────────────────────────────────────────────────────

fn address_item() -> FormNestedItemProps {
    FormNestedItemProps::new("addresses", "addresses.1")
        .with_label("Address")
        .with_shared_prop("disabled", json!(false))
        .with_field(NestedField::new("street").with_prop("inputType", json!("text")))
        .with_field(
            NestedField::new("city")
                .with_prop("inputType", json!("select"))
                .with_prop("disabled", json!(true)),
        )
}

#[test]
fn nested_fields_get_item_paths() {
    let item = FormNestedItem::new(address_item().with_item_index(1));
    let view = item.view(&MessageCatalog::english());

    assert_eq!(view.class_name, "form-nested-item");
    assert_eq!(view.fields.len(), 2);
    assert_eq!(view.fields[0].path, "addresses.1.street");
    assert_eq!(view.fields[1].path, "addresses.1.city");
    assert_eq!(view.fields[1].key, 1);
    assert_eq!(view.fields[0].item_index, Some(1));
    assert_eq!(
        Value::Object(view.fields[1].props.clone()),
        json!({"disabled": true, "inputType": "select", "name": "city"})
    );
}

#[test]
fn array_items_get_a_remove_button() {
    let item = FormNestedItem::new(address_item().with_item_index(1));
    let button = item
        .view(&MessageCatalog::english())
        .remove_button
        .expect("remove button");

    assert_eq!(button.class_name, "form-nested-button");
    assert_eq!(button.variant, "danger");
    assert_eq!(button.size, "sm");
    assert!(button.icon_button);
    assert_eq!(button.tab_index, -1);
    assert_eq!(button.aria_label, "Delete Address");
    assert_eq!(button.icon_size, 12);
}

#[test]
fn objects_and_hidden_removals_have_no_remove_button() {
    let catalog = MessageCatalog::english();
    let object = FormNestedItem::new(address_item());
    assert!(object.view(&catalog).remove_button.is_none());
    assert!(!object.remove());

    let hidden = FormNestedItem::new(address_item().with_item_index(0).with_hide_remove(true));
    assert!(hidden.view(&catalog).remove_button.is_none());
}

#[test]
fn remove_passes_the_field_name() {
    let (calls, sink) = recorder::<String>();
    let item = FormNestedItem::new(address_item().with_item_index(3))
        .on_remove_with(move |name| sink.lock().expect("lock").push(name.to_string()));

    assert!(item.remove());
    assert_eq!(*calls.lock().expect("lock"), vec!["addresses".to_string()]);
}
