use super::*;

#[test]
fn replaces_every_trigraph() {
    let normalized = normalize("??= ??( ??) ??< ??> ??/ ??' ??! ??-");
    assert_eq!(normalized.text, "# [ ] { } \\ ^ | ~");
}

#[test]
fn replaces_digraphs_outside_literals_and_comments() {
    let normalized = normalize("%:define A <: :> <% %> %:%: \"<:\" '<%' // <:\n/* %> */ <:");
    assert_eq!(normalized.text, "#define A [ ] { } ## \"<:\" '<%' // <:\n/* %> */ [");
}

#[test]
fn trigraphs_apply_inside_string_literals() {
    let normalized = normalize("\"??=\" '??/''");
    assert_eq!(normalized.text, "\"#\" '\\''");
}

#[test]
fn normalization_is_idempotent() {
    let inputs = [
        "??=define X ??<??>",
        "a<::>b <%%> %:%:%:",
        "????= ???( ?? ?",
        "\"??/\"\" <: '??'' :>",
        "/* ??/ <: */ <:<::>",
        "%:%??>",
    ];
    for input in inputs {
        let once = normalize(input).text;
        let twice = normalize(&once).text;
        assert_eq!(once, twice, "input: {input:?}");
    }
}

#[test]
fn offsets_map_back_to_original_sequences() {
    let normalized = normalize("a ??= b <: c");
    assert_eq!(normalized.text, "a # b [ c");
    let map = &normalized.offsets;
    assert_eq!(map.to_original(TextSize::from(0)), TextSize::from(0));
    assert_eq!(map.to_original(TextSize::from(2)), TextSize::from(2));
    assert_eq!(map.to_original(TextSize::from(4)), TextSize::from(6));
    assert_eq!(
        map.range_to_original(TextRange::at(TextSize::from(2), TextSize::from(1))),
        TextRange::at(TextSize::from(2), TextSize::from(3))
    );
    assert_eq!(
        map.range_to_original(TextRange::at(TextSize::from(6), TextSize::from(1))),
        TextRange::at(TextSize::from(8), TextSize::from(2))
    );
    assert_eq!(map.to_original(TextSize::from(8)), TextSize::from(11));
}

#[test]
fn identity_keeps_trigraphs() {
    let normalized = Normalized::identity("??=");
    assert_eq!(normalized.text, "??=");
    assert!(normalized.offsets.is_identity());
}
