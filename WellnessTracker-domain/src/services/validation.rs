use validator::ValidationErrors;

/// Flatten validator output into `field: message, message; field: message`
pub(crate) fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();

    // field_errors is a HashMap; keep the message stable
    fields.sort();
    fields.join("; ")
}
