use wizard_core::{
    AdapterView, ConfigureView, DocForm, FileItem, FinishView, NoticeLevel, Preview, ProcessRule,
    SelectView, StageView, Step, WizardViewModel,
};

const PREVIEW_LINES: usize = 20;

/// Full text frame for `view`, one entry per line.
pub fn render(view: &WizardViewModel) -> Vec<String> {
    let mut lines = vec![header(view)];
    match &view.stage {
        StageView::Unavailable { code, message } => lines.push(format!("[{code}] {message}")),
        StageView::Select(select) => render_select(select, &mut lines),
        StageView::AwaitingDetail => lines.push("Loading dataset...".to_string()),
        StageView::Configure(configure) => render_configure(configure, &mut lines),
        StageView::Finish(finish) => render_finish(finish, &mut lines),
    }
    if let Some(preview) = &view.preview {
        render_preview(preview, &mut lines);
    }
    lines
}

pub fn notice(level: NoticeLevel, message: &str) -> String {
    let tag = match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {message}")
}

fn header(view: &WizardViewModel) -> String {
    let steps: Vec<String> = Step::ALL
        .iter()
        .map(|step| {
            if *step == view.step {
                format!("[{}. {}]", step.index(), step.title())
            } else {
                format!("{}. {}", step.index(), step.title())
            }
        })
        .collect();
    match &view.dataset_id {
        Some(dataset_id) => format!("== {} == dataset {dataset_id}", steps.join(" > ")),
        None => format!("== {} ==", steps.join(" > ")),
    }
}

fn render_select(view: &SelectView, lines: &mut Vec<String>) {
    match &view.source_picker {
        Some(options) => {
            let entries: Vec<String> = options
                .iter()
                .map(|option| {
                    let mut label = option.source_type.label().to_string();
                    if option.coming_soon {
                        label.push_str(" (coming soon)");
                    }
                    if option.active {
                        format!("*{label}*")
                    } else {
                        label
                    }
                })
                .collect();
            lines.push(format!("Source: {}", entries.join(" | ")));
        }
        None => lines.push(format!(
            "Source: {} (fixed by this dataset)",
            view.active_source.label()
        )),
    }

    match &view.adapter {
        AdapterView::LoadingLimits => lines.push("Loading document limits...".to_string()),
        AdapterView::Files { items, limit } => {
            if let Some(limit) = limit {
                lines.push(format!(
                    "Documents: {} of {} used, {} left",
                    limit.documents_count,
                    limit.documents_limit,
                    limit.remaining()
                ));
            }
            if items.is_empty() {
                lines.push("No files picked. Use `add <path>`.".to_string());
            }
            lines.extend(items.iter().map(format_file_row));
        }
        AdapterView::NotionCheckingConnection => {
            lines.push("Checking the Notion connection...".to_string())
        }
        AdapterView::NotionConnect => {
            lines.push("Notion is not connected. Use `connect` to set it up.".to_string())
        }
        AdapterView::Notion { selected, limit } => {
            if let Some(limit) = limit {
                lines.push(format!("Pages left in quota: {}", limit.remaining()));
            }
            if selected.is_empty() {
                lines.push("No pages selected. Use `pick`.".to_string());
            }
            for page in selected {
                lines.push(format!(
                    "  {} {} ({}, workspace {})",
                    page.page_id, page.page_name, page.page_type, page.workspace_id
                ));
            }
        }
        AdapterView::Lark {
            input,
            loading,
            committed,
            committed_title,
            link,
        } => {
            if *loading {
                lines.push(format!("Looking up {input}..."));
            } else if !input.is_empty() {
                lines.push(format!("Input: {input}"));
            }
            match (committed, committed_title) {
                (Some(reference), Some(title)) if !title.is_empty() => {
                    lines.push(format!("Selected: {title} <{reference}>"))
                }
                (Some(reference), _) => lines.push(format!("Selected: {reference}")),
                (None, _) => lines.push("No document selected. Use `link <url>`.".to_string()),
            }
            if let Some(link) = link {
                lines.push(format!("  {:?} document {}", link.kind, link.token));
            }
        }
        AdapterView::ComingSoon => lines.push("This source is coming soon.".to_string()),
    }

    if view.creating_empty {
        lines.push("Creating an empty dataset...".to_string());
    } else if view.can_create_empty {
        lines.push("Or `create <name>` for an empty dataset.".to_string());
    }
    lines.push(if view.next_enabled {
        "`next` to configure".to_string()
    } else {
        "next: select something first".to_string()
    });
}

fn format_file_row(item: &FileItem) -> String {
    let status = match (item.is_uploaded(), item.progress) {
        (true, _) => "uploaded".to_string(),
        (false, Some(percent)) => format!("{percent}%"),
        (false, None) => "waiting".to_string(),
    };
    format!(
        "  {} {} ({} bytes) {}",
        item.file_id, item.file.name, item.file.size, status
    )
}

fn render_configure(view: &ConfigureView, lines: &mut Vec<String>) {
    lines.push(format!(
        "{} item(s) from {}",
        view.item_count,
        view.source_type.label()
    ));
    let locked = if view.technique_locked {
        " (fixed by this dataset)"
    } else {
        ""
    };
    lines.push(format!(
        "Technique: {}{locked}",
        view.config.indexing_technique
    ));
    lines.push(format!("Rule: {}", describe_rule(&view.config.process_rule)));
    lines.push(format!(
        "Form: {} | Language: {}",
        match view.config.doc_form {
            DocForm::TextModel => "text",
            DocForm::QaModel => "Q&A",
        },
        view.config.doc_language
    ));
    if !view.config_valid {
        lines.push("Configuration is invalid; fix it to estimate or submit.".to_string());
    }

    if view.estimating {
        lines.push("Estimating...".to_string());
    } else if let Some(estimate) = &view.estimate {
        let price = match (&estimate.total_price, &estimate.currency) {
            (Some(price), Some(currency)) => format!(", about {price} {currency}"),
            (Some(price), None) => format!(", about {price}"),
            _ => String::new(),
        };
        lines.push(format!(
            "Estimate: {} segments, {} tokens{price}",
            format_with_commas(estimate.total_segments),
            format_with_commas(estimate.tokens)
        ));
    }

    if view.submitting {
        lines.push("Submitting...".to_string());
    } else if view.submit_enabled {
        lines.push("`submit` to start indexing, `back` to change the selection".to_string());
    }
}

fn describe_rule(rule: &ProcessRule) -> String {
    match rule {
        ProcessRule::Automatic => "automatic".to_string(),
        ProcessRule::Custom(rule) => {
            let mut cleaning = Vec::new();
            if rule.remove_extra_spaces {
                cleaning.push("collapse spaces");
            }
            if rule.remove_urls_emails {
                cleaning.push("strip urls and emails");
            }
            let cleaning = if cleaning.is_empty() {
                String::new()
            } else {
                format!(", {}", cleaning.join(", "))
            };
            format!(
                "custom, split on {:?}, at most {} tokens{cleaning}",
                rule.separator, rule.max_tokens
            )
        }
    }
}

fn render_finish(view: &FinishView, lines: &mut Vec<String>) {
    match (&view.dataset_name, &view.dataset_id) {
        (Some(name), Some(id)) => lines.push(format!("Dataset {name} ({id})")),
        (None, Some(id)) => lines.push(format!("Dataset {id}")),
        (Some(name), None) => lines.push(format!("Dataset {name}")),
        (None, None) => {}
    }
    if let Some(technique) = view.indexing_technique {
        lines.push(format!("Technique: {technique}"));
    }
    if let Some(result) = &view.result {
        match result.batch() {
            Some(batch) => lines.push(format!(
                "{} document(s) queued in batch {batch}",
                result.document_count()
            )),
            None => lines.push(format!("{} document(s) queued", result.document_count())),
        }
    }
    if view.status_loading {
        lines.push("Refreshing status...".to_string());
    }
    for status in &view.statuses {
        let mut line = format!(
            "  {} {} {}% ({}/{})",
            status.id,
            status.indexing_status,
            status.percent(),
            status.completed_segments,
            status.total_segments
        );
        if let Some(error) = &status.error {
            line.push_str(&format!(" error: {error}"));
        }
        lines.push(line);
    }
    if view.statuses.is_empty() && !view.status_loading {
        lines.push("`status` to check indexing progress".to_string());
    }
}

fn render_preview(preview: &Preview, lines: &mut Vec<String>) {
    lines.push(format!("--- {} ---", preview.title()));
    let content: Vec<&str> = preview.content().lines().collect();
    lines.extend(content.iter().take(PREVIEW_LINES).map(|line| line.to_string()));
    if content.len() > PREVIEW_LINES {
        lines.push(format!("({} more lines)", content.len() - PREVIEW_LINES));
    }
    lines.push("--- `close` to dismiss ---".to_string());
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
