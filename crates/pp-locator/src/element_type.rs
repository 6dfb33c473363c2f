/// Human-readable element kind shown in the match table's Type column.
pub fn element_type_label(tag: &str) -> String {
    let tag = tag.to_ascii_lowercase();
    let label = match tag.as_str() {
        "button" => "Button",
        "input" => "Input Field",
        "select" => "Dropdown",
        "textarea" => "Text Area",
        "a" => "Link",
        "img" => "Image",
        "label" => "Label",
        "table" => "Table",
        "tr" => "Row",
        "td" => "Column",
        "th" => "Column Header",
        "div" => "Section",
        "span" => "Text Span",
        "ul" => "List",
        "li" => "List Item",
        "option" => "Option",
        _ => return format!("Text <{tag}>"),
    };
    label.to_owned()
}
