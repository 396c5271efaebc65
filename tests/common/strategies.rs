use proptest::prelude::*;

/// Order ids as the upstream system issues them
pub fn order_id_strategy() -> impl Strategy<Value = String> {
    "[1-9][0-9]{5}"
}

/// Free text that never contains a digit
pub fn digitless_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z ,.!?]{0,40}"
}

/// Arbitrary ticket-ish text: markup fragments, words and numbers
pub fn raw_message_strategy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("<div>".to_string()),
        Just("</div>".to_string()),
        Just("<b>Order ID</b>: ".to_string()),
        Just("Order ID ".to_string()),
        Just("<hr>".to_string()),
        Just("\n---\n".to_string()),
        Just("<br>".to_string()),
        "[0-9]{1,14}",
        "[a-zA-Z ]{1,12}",
        Just(", ".to_string()),
    ];
    prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.concat())
}
