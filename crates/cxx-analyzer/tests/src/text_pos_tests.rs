use super::*;

#[test]
fn line_index_maps_offsets_to_lines() {
    let text = "int a;\nint b;\n\nint c;";
    let index = LineIndex::new(text);
    assert_eq!(index.line_count(), 4);
    assert_eq!(
        index.line_col(text, TextSize::from(0)),
        LineCol {
            line: 0,
            col: 0
        }
    );
    assert_eq!(
        index.line_col(text, TextSize::from(11)),
        LineCol {
            line: 1,
            col: 4
        }
    );
    assert_eq!(
        index.line_col(text, TextSize::from(15)),
        LineCol {
            line: 3,
            col: 0
        }
    );
}

#[test]
fn offsets_round_trip_through_line_col() {
    let text = "struct A {\n  int name;\n};\n";
    let offset = text.find("name").unwrap_or_default();
    let position = line_col_from_byte_offset(text, offset);
    assert_eq!(
        position,
        LineCol {
            line: 1,
            col: 6
        }
    );
    assert_eq!(byte_offset_from_line_col(text, position), Some(offset));
}

#[test]
fn out_of_range_line_has_no_offset() {
    assert_eq!(
        byte_offset_from_line_col(
            "a\nb",
            LineCol {
                line: 5,
                col: 0
            }
        ),
        None
    );
}
