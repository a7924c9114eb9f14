/// Collapse doubled newlines and doubled spaces until nothing changes.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = current.replace("\n\n", "\n").replace("  ", " ");
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}
