use serde_json::{json, Value};

use crate::{DataSourcePayload, IndexingPayload, NotionPageRef, ProcessRulePayload};

pub(crate) fn info_list(source: &DataSourcePayload) -> Value {
    match source {
        DataSourcePayload::Files { file_ids } => json!({
            "data_source_type": source.wire_type(),
            "file_info_list": { "file_ids": file_ids },
        }),
        DataSourcePayload::Lark { reference } => json!({
            "data_source_type": source.wire_type(),
            "file_info_list": { "file_ids": [reference] },
        }),
        DataSourcePayload::Notion { pages } => json!({
            "data_source_type": source.wire_type(),
            "notion_info_list": notion_info_list(pages),
        }),
    }
}

/// Pages grouped by workspace, in first-seen workspace order.
fn notion_info_list(pages: &[NotionPageRef]) -> Value {
    let mut workspaces: Vec<(&str, Vec<Value>)> = Vec::new();
    for page in pages {
        let entry = json!({
            "page_id": page.page_id,
            "page_name": page.page_name,
            "page_icon": page.page_icon,
            "type": page.page_type,
        });
        match workspaces
            .iter()
            .position(|(workspace_id, _)| *workspace_id == page.workspace_id)
        {
            Some(index) => workspaces[index].1.push(entry),
            None => workspaces.push((page.workspace_id.as_str(), vec![entry])),
        }
    }
    Value::Array(
        workspaces
            .into_iter()
            .map(|(workspace_id, pages)| json!({ "workspace_id": workspace_id, "pages": pages }))
            .collect(),
    )
}

pub(crate) fn process_rule(rule: &ProcessRulePayload) -> Value {
    match rule {
        ProcessRulePayload::Automatic => json!({ "mode": "automatic", "rules": {} }),
        ProcessRulePayload::Custom {
            separator,
            max_tokens,
            remove_extra_spaces,
            remove_urls_emails,
        } => json!({
            "mode": "custom",
            "rules": {
                "pre_processing_rules": [
                    { "id": "remove_extra_spaces", "enabled": remove_extra_spaces },
                    { "id": "remove_urls_emails", "enabled": remove_urls_emails },
                ],
                "segmentation": { "separator": separator, "max_tokens": max_tokens },
            },
        }),
    }
}

pub(crate) fn estimate_body(payload: &IndexingPayload) -> Value {
    json!({
        "info_list": info_list(&payload.data_source),
        "indexing_technique": payload.indexing_technique,
        "process_rule": process_rule(&payload.process_rule),
        "doc_form": payload.doc_form,
        "doc_language": payload.doc_language,
    })
}

pub(crate) fn submit_body(payload: &IndexingPayload) -> Value {
    json!({
        "data_source": {
            "type": payload.data_source.wire_type(),
            "info_list": info_list(&payload.data_source),
        },
        "indexing_technique": payload.indexing_technique,
        "process_rule": process_rule(&payload.process_rule),
        "doc_form": payload.doc_form,
        "doc_language": payload.doc_language,
    })
}
