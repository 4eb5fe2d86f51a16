// =============================================================================
// GOOGLE DOCS API RESPONSE STRUCTURES
// =============================================================================
//
// Only the parts of the Docs JSON we read are modelled. Documents fetched with
// `includeTabsContent=true` carry their text under `tabs`; older responses
// put it straight in `body`. Both are flattened into plain paragraphs.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tabs: Vec<Tab>,
    pub body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub tab_properties: Option<TabProperties>,
    pub document_tab: Option<DocumentTab>,
    #[serde(default)]
    pub child_tabs: Vec<Tab>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabProperties {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTab {
    pub body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    pub paragraph: Option<Paragraph>,
    pub table: Option<Table>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

impl Document {
    /// Flattens the document into paragraphs without trailing newlines.
    ///
    /// With more than one tab, each tab's title becomes a paragraph of its own
    /// so the agent can tell the tabs apart.
    pub fn paragraphs(&self) -> Vec<String> {
        let mut out = Vec::new();

        if self.tabs.is_empty() {
            if let Some(body) = &self.body {
                push_body(body, &mut out);
            }
            return out;
        }

        let titled = self.tabs.len() > 1 || self.tabs.iter().any(|t| !t.child_tabs.is_empty());
        push_tabs(&self.tabs, titled, &mut out);
        out
    }
}

fn push_tabs(tabs: &[Tab], titled: bool, out: &mut Vec<String>) {
    for tab in tabs {
        if titled {
            if let Some(props) = &tab.tab_properties {
                out.push(props.title.clone());
            }
        }

        if let Some(body) = tab.document_tab.as_ref().and_then(|t| t.body.as_ref()) {
            push_body(body, out);
        }

        push_tabs(&tab.child_tabs, titled, out);
    }
}

fn push_body(body: &Body, out: &mut Vec<String>) {
    for element in &body.content {
        push_element(element, out);
    }
}

fn push_element(element: &StructuralElement, out: &mut Vec<String>) {
    if let Some(paragraph) = &element.paragraph {
        out.push(paragraph_text(paragraph));
    }

    if let Some(table) = &element.table {
        for row in &table.table_rows {
            let cells: Vec<String> = row
                .table_cells
                .iter()
                .map(|cell| {
                    let mut parts = Vec::new();
                    for cell_element in &cell.content {
                        push_element(cell_element, &mut parts);
                    }
                    parts.join(" ").trim().to_string()
                })
                .collect();
            out.push(format!("| {} |", cells.join(" | ")));
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for element in &paragraph.elements {
        if let Some(content) = element.text_run.as_ref().and_then(|r| r.content.as_ref()) {
            text.push_str(content);
        }
    }

    // Soft line breaks (shift+enter) arrive as vertical tabs.
    text.replace('\u{000b}', "\n")
        .trim_end_matches('\n')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str) -> serde_json::Value {
        serde_json::json!({ "paragraph": { "elements": [ { "textRun": { "content": text } } ] } })
    }

    #[test]
    fn test_body_document_flattens_paragraphs() {
        let json = serde_json::json!({
            "documentId": "d1",
            "title": "Charlotte - Monday",
            "body": { "content": [
                { "sectionBreak": {} },
                para("12/05/2025\n"),
                para("Scales\u{000b}and chords\n"),
            ]}
        });

        let doc: Document = serde_json::from_value(json).unwrap();
        assert_eq!(doc.paragraphs(), vec!["12/05/2025", "Scales\nand chords"]);
    }

    #[test]
    fn test_tables_become_rows() {
        let json = serde_json::json!({
            "title": "t",
            "body": { "content": [
                { "table": { "tableRows": [
                    { "tableCells": [ { "content": [para("Piece\n")] }, { "content": [para("Grade\n")] } ] },
                    { "tableCells": [ { "content": [para("Minuet\n")] }, { "content": [para("3\n")] } ] }
                ]}}
            ]}
        });

        let doc: Document = serde_json::from_value(json).unwrap();
        assert_eq!(doc.paragraphs(), vec!["| Piece | Grade |", "| Minuet | 3 |"]);
    }

    #[test]
    fn test_multiple_tabs_are_titled() {
        let json = serde_json::json!({
            "title": "t",
            "tabs": [
                { "tabProperties": { "title": "2024" },
                  "documentTab": { "body": { "content": [para("old\n")] } } },
                { "tabProperties": { "title": "2025" },
                  "documentTab": { "body": { "content": [para("new\n")] } } }
            ]
        });

        let doc: Document = serde_json::from_value(json).unwrap();
        assert_eq!(doc.paragraphs(), vec!["2024", "old", "2025", "new"]);
    }

    #[test]
    fn test_single_tab_is_not_titled() {
        let json = serde_json::json!({
            "title": "t",
            "tabs": [
                { "tabProperties": { "title": "Tab 1" },
                  "documentTab": { "body": { "content": [para("only\n")] } } }
            ]
        });

        let doc: Document = serde_json::from_value(json).unwrap();
        assert_eq!(doc.paragraphs(), vec!["only"]);
    }
}
