/// Join `///` comment lines into plain doc text (markers and one leading space removed).
pub fn doc_comment_text<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let body: Vec<&str> = lines
        .into_iter()
        .flat_map(str::lines)
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix("///").unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect();
    let text = body.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Plain-text summary of an XML doc comment: the `<summary>` element when present,
/// otherwise the whole comment, with markup removed and whitespace collapsed.
/// `<see cref="T:App.User"/>` renders as `User`.
pub fn summary_from_doc(doc: &str) -> Option<String> {
    let lower = doc.to_ascii_lowercase();
    let body = match (lower.find("<summary>"), lower.find("</summary>")) {
        (Some(start), Some(end)) if end > start => &doc[start + "<summary>".len()..end],
        _ => doc,
    };
    let text = strip_markup(body);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let tag = &rest[open + 1..open + close];
        if let Some(reference) = attribute_value(tag, "cref").or_else(|| attribute_value(tag, "langword")) {
            let reference = reference.rsplit(':').next().unwrap_or(reference);
            let reference = reference.rsplit('.').next().unwrap_or(reference);
            out.push_str(reference);
        } else {
            out.push(' ');
        }
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

fn attribute_value<'a>(tag: &'a str, attribute: &str) -> Option<&'a str> {
    let marker = format!("{attribute}=\"");
    let start = tag.find(&marker)? + marker.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}
