//! Operator command line: one command per line, words separated by whitespace.

use std::path::PathBuf;

use thiserror::Error;
use wizard_core::{
    CustomRule, DataSourceType, DocForm, IndexingTechnique, LarkTrigger, Msg, NotionPage,
    ProcessRule,
};

pub const HELP: &str = "\
Select stage
  source <lark|file|notion|web>     switch the data source
  link <url>                        look up a Lark document and select it
  search                            look up the current Lark input again
  dismiss                           drop the selected Lark document
  add <path>...                     pick local files and start uploading them
  rm <file-id>                      remove a picked file
  pick <workspace> <page> [--database] <name>
                                    select a Notion page
  unpick <page-id>                  deselect a Notion page
  connect                           open the Notion integration settings
  preview <file-id|page-id>         show a picked item
  close                             close the preview
  create <name>                     create an empty dataset instead
  next                              continue to the configure stage
Configure stage
  technique <high_quality|economy>
  rule auto | rule custom <max-tokens> [separator] [--keep-spaces] [--strip-urls]
  form <text|qa>
  language <name>
  estimate                          estimate segments and cost
  submit                            start indexing
  back                              return to source selection
Finish stage
  status                            refresh the indexing status
Anywhere
  show | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Messages to dispatch in order.
    Wizard(Vec<Msg>),
    /// Files to inspect on disk before they enter the wizard.
    AddFiles(Vec<PathBuf>),
    /// A Notion page to add to the current selection.
    PickNotionPage(NotionPage),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("`{value}` is not a valid {what}")]
    InvalidValue { what: &'static str, value: String },
}

/// Parses one input line; blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word.to_ascii_lowercase().as_str() {
        "source" => one(Msg::SourceTypeSelected(source_type(single(
            &args,
            "source <lark|file|notion|web>",
        )?)?)),
        "link" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("link <url>"));
            }
            Command::Wizard(vec![
                Msg::LarkInputChanged(rest.to_string()),
                Msg::LarkSubmitted(LarkTrigger::Enter),
            ])
        }
        "search" => one(Msg::LarkSubmitted(LarkTrigger::Search)),
        "dismiss" => one(Msg::LarkSelectionDismissed),
        "add" => {
            if args.is_empty() {
                return Err(CommandError::Usage("add <path>..."));
            }
            Command::AddFiles(args.iter().map(PathBuf::from).collect())
        }
        "rm" | "remove" => one(Msg::FileRemoved {
            file_id: single(&args, "rm <file-id>")?.to_string(),
        }),
        "pick" => Command::PickNotionPage(notion_page(&args)?),
        "unpick" => one(Msg::NotionPageDeselected {
            page_id: single(&args, "unpick <page-id>")?.to_string(),
        }),
        "connect" => one(Msg::NotionSetupRequested),
        "preview" => one(Msg::PreviewRequested {
            key: single(&args, "preview <file-id|page-id>")?.to_string(),
        }),
        "close" => one(Msg::PreviewClosed),
        "create" => one(Msg::EmptyDatasetRequested {
            name: rest.to_string(),
        }),
        "next" => one(Msg::NextClicked),
        "back" => one(Msg::BackClicked),
        "technique" => one(Msg::IndexingTechniqueChosen(technique(single(
            &args,
            "technique <high_quality|economy>",
        )?)?)),
        "rule" => one(Msg::ProcessRuleChanged(process_rule(&args)?)),
        "form" => one(Msg::DocFormChanged(doc_form(single(&args, "form <text|qa>")?)?)),
        "language" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("language <name>"));
            }
            one(Msg::DocLanguageChanged(rest.to_string()))
        }
        "estimate" => one(Msg::EstimateRequested),
        "submit" => one(Msg::SubmitClicked),
        "status" => one(Msg::IndexingStatusRequested),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(Some(command))
}

fn one(msg: Msg) -> Command {
    Command::Wizard(vec![msg])
}

fn single<'a>(args: &[&'a str], usage: &'static str) -> Result<&'a str, CommandError> {
    match args {
        [value] => Ok(*value),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn invalid(what: &'static str, value: &str) -> CommandError {
    CommandError::InvalidValue {
        what,
        value: value.to_string(),
    }
}

fn source_type(value: &str) -> Result<DataSourceType, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "lark" | "feishu" => Ok(DataSourceType::Lark),
        "file" | "files" => Ok(DataSourceType::File),
        "notion" => Ok(DataSourceType::Notion),
        "web" => Ok(DataSourceType::Web),
        other => DataSourceType::from_wire(other).ok_or_else(|| invalid("source", value)),
    }
}

fn technique(value: &str) -> Result<IndexingTechnique, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "high" | "high_quality" => Ok(IndexingTechnique::HighQuality),
        "economy" => Ok(IndexingTechnique::Economy),
        _ => Err(invalid("indexing technique", value)),
    }
}

fn doc_form(value: &str) -> Result<DocForm, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "text" | "text_model" => Ok(DocForm::TextModel),
        "qa" | "qa_model" => Ok(DocForm::QaModel),
        _ => Err(invalid("document form", value)),
    }
}

const RULE_USAGE: &str =
    "rule auto | rule custom <max-tokens> [separator] [--keep-spaces] [--strip-urls]";

/// Range checks are left to the wizard, which disables submission for invalid rules.
fn process_rule(args: &[&str]) -> Result<ProcessRule, CommandError> {
    match args.split_first() {
        Some((&"auto", [])) => Ok(ProcessRule::Automatic),
        Some((&"custom", rest)) => {
            let mut rule = CustomRule::default();
            let mut positional = Vec::new();
            for arg in rest {
                match *arg {
                    "--keep-spaces" => rule.remove_extra_spaces = false,
                    "--strip-urls" => rule.remove_urls_emails = true,
                    flag if flag.starts_with("--") => return Err(invalid("rule flag", flag)),
                    value => positional.push(value),
                }
            }
            match positional.as_slice() {
                [max_tokens] => {
                    rule.max_tokens = tokens(max_tokens)?;
                }
                [max_tokens, separator] => {
                    rule.max_tokens = tokens(max_tokens)?;
                    rule.separator = (*separator).to_string();
                }
                _ => return Err(CommandError::Usage(RULE_USAGE)),
            }
            Ok(ProcessRule::Custom(rule))
        }
        _ => Err(CommandError::Usage(RULE_USAGE)),
    }
}

fn tokens(value: &str) -> Result<u32, CommandError> {
    value.parse().map_err(|_| invalid("token count", value))
}

const PICK_USAGE: &str = "pick <workspace> <page> [--database] <name>";

fn notion_page(args: &[&str]) -> Result<NotionPage, CommandError> {
    let [workspace_id, page_id, rest @ ..] = args else {
        return Err(CommandError::Usage(PICK_USAGE));
    };
    let (page_type, name_words) = match rest.split_first() {
        Some((&"--database", words)) => ("database", words),
        _ => ("page", rest),
    };
    if name_words.is_empty() {
        return Err(CommandError::Usage(PICK_USAGE));
    }
    Ok(NotionPage {
        page_id: (*page_id).to_string(),
        page_name: name_words.join(" "),
        page_icon: None,
        workspace_id: (*workspace_id).to_string(),
        page_type: page_type.to_string(),
    })
}
