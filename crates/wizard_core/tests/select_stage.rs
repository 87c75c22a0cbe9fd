use std::path::PathBuf;
use std::sync::{Arc, Once};

use pretty_assertions::assert_eq;
use wizard_core::{
    update, AdapterView, DataSourceType, DocumentsLimit, Effect, FileHandle, FileItem, Msg,
    NoticeLevel, NotionPage, Preview, PreviewContent, PreviewTarget, RequestFailure, SelectView,
    StageView, Step, UploadedFile, WizardState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(wizard_logging::initialize_for_tests);
}

const LIMIT: DocumentsLimit = DocumentsLimit {
    documents_limit: 50,
    documents_count: 3,
};

/// Mounts a new-dataset wizard and answers its one-time fetches.
fn mounted(connected: bool) -> WizardState {
    let (mut state, effects) = update(WizardState::new(), Msg::Mounted);
    for effect in effects {
        let msg = match effect {
            Effect::FetchConnectionStatus { epoch, .. } => Msg::ConnectionStatusLoaded {
                epoch,
                result: Ok(connected),
            },
            Effect::FetchDocumentsLimit { epoch } => Msg::DocumentsLimitLoaded {
                epoch,
                result: Ok(LIMIT),
            },
            other => panic!("unexpected mount effect: {other:?}"),
        };
        state = update(state, msg).0;
    }
    state
}

fn select_view(state: &WizardState) -> SelectView {
    match state.view().stage {
        StageView::Select(view) => view,
        other => panic!("expected select stage, got {other:?}"),
    }
}

fn file_item(file_id: &str) -> FileItem {
    FileItem::new(
        file_id,
        FileHandle {
            name: format!("{file_id}.txt"),
            path: PathBuf::from(format!("/tmp/{file_id}.txt")),
            size: 12,
            extension: Some("txt".to_string()),
            id: None,
        },
    )
}

fn uploaded(id: &str) -> UploadedFile {
    UploadedFile {
        id: id.to_string(),
        name: "f1.txt".to_string(),
        size: 12,
        extension: Some("txt".to_string()),
    }
}

fn page(page_id: &str) -> NotionPage {
    NotionPage {
        page_id: page_id.to_string(),
        page_name: format!("Page {page_id}"),
        page_icon: None,
        workspace_id: "ws-1".to_string(),
        page_type: "page".to_string(),
    }
}

#[test]
fn mount_fetches_connection_and_limit_once() {
    init_logging();
    let (state, effects) = update(WizardState::new(), Msg::Mounted);
    assert_eq!(
        effects,
        vec![
            Effect::FetchConnectionStatus {
                epoch: 1,
                provider: "notion".to_string(),
            },
            Effect::FetchDocumentsLimit { epoch: 1 },
        ]
    );

    let (_state, effects) = update(state, Msg::Mounted);
    assert!(effects.is_empty());
}

#[test]
fn uploaded_file_enables_forward_and_moves_to_configure() {
    init_logging();
    let state = mounted(true);
    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::File));

    let (state, effects) = update(state, Msg::FilesAdded(vec![file_item("f1")]));
    assert_eq!(
        effects,
        vec![Effect::UploadFile {
            file_id: "f1".to_string(),
            path: PathBuf::from("/tmp/f1.txt"),
        }]
    );
    assert!(!state.is_ready());

    let (state, _) = update(
        state,
        Msg::FileUploadProgress {
            file_id: "f1".to_string(),
            progress: 40,
        },
    );
    assert!(!state.is_ready());
    assert!(!select_view(&state).next_enabled);

    let (state, _) = update(
        state,
        Msg::FileUploaded {
            file_id: "f1".to_string(),
            file: uploaded("srv-1"),
        },
    );
    let items = state.files().items();
    assert_eq!(items[0].progress, Some(100));
    assert_eq!(items[0].file.id.as_deref(), Some("srv-1"));
    assert!(state.is_ready());
    assert!(select_view(&state).next_enabled);

    let (state, effects) = update(state, Msg::NextClicked);
    assert!(effects.is_empty());
    assert_eq!(state.step(), Step::Configure);
}

#[test]
fn forward_is_blocked_until_ready() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::NextClicked);
    assert_eq!(state.step(), Step::Select);

    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::File));
    let (state, _) = update(state, Msg::FilesAdded(vec![file_item("f1")]));
    let (state, _) = update(state, Msg::NextClicked);
    assert_eq!(state.step(), Step::Select);
}

#[test]
fn progress_ticks_replace_the_visible_list() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::File));
    let (mut state, _) = update(state, Msg::FilesAdded(vec![file_item("a"), file_item("b")]));
    state.consume_dirty();

    let before = match select_view(&state).adapter {
        AdapterView::Files { items, .. } => items,
        other => panic!("expected file adapter, got {other:?}"),
    };
    let (mut state, _) = update(
        state,
        Msg::FileUploadProgress {
            file_id: "b".to_string(),
            progress: 70,
        },
    );
    assert!(state.consume_dirty());

    let after = match select_view(&state).adapter {
        AdapterView::Files { items, .. } => items,
        other => panic!("expected file adapter, got {other:?}"),
    };
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before[1].progress, None);
    assert_eq!(after[1].progress, Some(70));
}

#[test]
fn failed_upload_removes_the_file_and_notifies() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::File));
    let (state, _) = update(state, Msg::FilesAdded(vec![file_item("f1")]));

    let (state, effects) = update(
        state,
        Msg::FileUploadFailed {
            file_id: "f1".to_string(),
            failure: RequestFailure::new(Some(413), "file too large"),
        },
    );
    assert!(state.files().items().is_empty());
    assert!(matches!(
        effects.as_slice(),
        [Effect::Notify {
            level: NoticeLevel::Error,
            ..
        }]
    ));

    // A late failure for an already removed file is silent.
    let (_state, effects) = update(
        state,
        Msg::FileUploadFailed {
            file_id: "f1".to_string(),
            failure: RequestFailure::new(None, "reset"),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn switching_source_clears_other_selections() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::Notion));
    let (state, _) = update(state, Msg::NotionPagesSelected(vec![page("p1")]));
    assert!(state.is_ready());

    // Re-selecting the active type keeps the selection.
    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::Notion));
    assert_eq!(state.notion().pages().len(), 1);

    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::File));
    assert!(!state.is_ready());
    assert!(state.notion().pages().is_empty());

    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::Notion));
    assert!(state.notion().pages().is_empty());
    assert!(!state.is_ready());
}

#[test]
fn web_source_is_selectable_but_never_ready() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::Web));
    let view = select_view(&state);

    assert_eq!(view.active_source, DataSourceType::Web);
    assert_eq!(view.adapter, AdapterView::ComingSoon);
    let picker = view.source_picker.expect("picker shown for new datasets");
    let web = picker
        .iter()
        .find(|option| option.source_type == DataSourceType::Web)
        .expect("web option");
    assert!(web.active);
    assert!(web.coming_soon);

    let (state, _) = update(state, Msg::NextClicked);
    assert_eq!(state.step(), Step::Select);
}

#[test]
fn notion_adapter_follows_connection_status() {
    init_logging();
    let (state, effects) = update(WizardState::new(), Msg::Mounted);
    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::Notion));
    assert_eq!(select_view(&state).adapter, AdapterView::NotionCheckingConnection);

    let epoch = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchConnectionStatus { epoch, .. } => Some(*epoch),
            _ => None,
        })
        .expect("connection fetch");
    let (state, _) = update(
        state,
        Msg::ConnectionStatusLoaded {
            epoch,
            result: Ok(false),
        },
    );
    assert_eq!(select_view(&state).adapter, AdapterView::NotionConnect);

    let (_state, effects) = update(state, Msg::NotionSetupRequested);
    assert_eq!(effects, vec![Effect::OpenDataSourceSettings]);
}

#[test]
fn notion_pages_gate_readiness() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::Notion));
    let (state, _) = update(
        state,
        Msg::NotionPagesSelected(vec![page("p1"), page("p2"), page("p1")]),
    );
    assert!(state.is_ready());
    assert_eq!(
        select_view(&state).adapter,
        AdapterView::Notion {
            selected: vec![page("p1"), page("p2")],
            limit: Some(LIMIT),
        }
    );

    let (state, _) = update(
        state,
        Msg::NotionPageDeselected {
            page_id: "p1".to_string(),
        },
    );
    assert!(state.is_ready());
    let (state, _) = update(
        state,
        Msg::NotionPageDeselected {
            page_id: "p2".to_string(),
        },
    );
    assert!(!state.is_ready());
}

#[test]
fn limits_pending_then_unavailable() {
    init_logging();
    let (state, effects) = update(WizardState::new(), Msg::Mounted);
    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::File));
    assert_eq!(select_view(&state).adapter, AdapterView::LoadingLimits);

    let epoch = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchDocumentsLimit { epoch } => Some(*epoch),
            _ => None,
        })
        .expect("limit fetch");
    let (state, effects) = update(
        state,
        Msg::DocumentsLimitLoaded {
            epoch,
            result: Err(RequestFailure::new(Some(503), "unavailable")),
        },
    );
    assert!(matches!(
        effects.as_slice(),
        [Effect::Notify {
            level: NoticeLevel::Warning,
            ..
        }]
    ));
    match select_view(&state).adapter {
        AdapterView::Files { limit, .. } => assert_eq!(limit, None),
        other => panic!("expected file adapter, got {other:?}"),
    }
}

#[test]
fn file_preview_opens_and_closes_with_the_file() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::File));
    let (state, _) = update(state, Msg::FilesAdded(vec![file_item("f1")]));

    let (state, effects) = update(
        state,
        Msg::PreviewRequested {
            key: "f1".to_string(),
        },
    );
    let target = PreviewTarget::LocalFile {
        file_id: "f1".to_string(),
        name: "f1.txt".to_string(),
        path: PathBuf::from("/tmp/f1.txt"),
    };
    let epoch = match effects.as_slice() {
        [Effect::FetchPreview { epoch, target: t }] => {
            assert_eq!(t, &target);
            *epoch
        }
        other => panic!("expected a preview fetch, got {other:?}"),
    };

    let (state, _) = update(
        state,
        Msg::PreviewLoaded {
            epoch,
            target,
            result: Ok(PreviewContent {
                title: String::new(),
                content: "hello".to_string(),
            }),
        },
    );
    assert_eq!(
        state.preview(),
        Some(&Preview::File {
            file_id: "f1".to_string(),
            title: "f1.txt".to_string(),
            content: "hello".to_string(),
        })
    );

    let (state, _) = update(
        state,
        Msg::FileRemoved {
            file_id: "f1".to_string(),
        },
    );
    assert_eq!(state.preview(), None);
}

#[test]
fn preview_close_keeps_selection() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::Notion));
    let (state, _) = update(state, Msg::NotionPagesSelected(vec![page("p1")]));
    let (state, effects) = update(
        state,
        Msg::PreviewRequested {
            key: "p1".to_string(),
        },
    );
    let (epoch, target) = match effects.as_slice() {
        [Effect::FetchPreview { epoch, target }] => (*epoch, target.clone()),
        other => panic!("expected a preview fetch, got {other:?}"),
    };
    assert_eq!(target, PreviewTarget::NotionPage(page("p1")));

    let (state, _) = update(
        state,
        Msg::PreviewLoaded {
            epoch,
            target,
            result: Ok(PreviewContent {
                title: "Page p1".to_string(),
                content: "body".to_string(),
            }),
        },
    );
    assert_eq!(state.preview().map(Preview::title), Some("Page p1"));

    let (state, _) = update(state, Msg::PreviewClosed);
    assert_eq!(state.preview(), None);
    assert_eq!(state.notion().page_ids(), vec!["p1".to_string()]);
    assert!(state.is_ready());
}

#[test]
fn back_at_select_stays_on_select() {
    init_logging();
    let (state, effects) = update(mounted(true), Msg::BackClicked);
    assert!(effects.is_empty());
    assert_eq!(state.step(), Step::Select);
}

/// Requests a preview for `key` and answers it.
fn open_preview(state: WizardState, key: &str) -> WizardState {
    let (state, effects) = update(
        state,
        Msg::PreviewRequested {
            key: key.to_string(),
        },
    );
    let (epoch, target) = match effects.as_slice() {
        [Effect::FetchPreview { epoch, target }] => (*epoch, target.clone()),
        other => panic!("expected a preview fetch, got {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::PreviewLoaded {
            epoch,
            target,
            result: Ok(PreviewContent {
                title: format!("Title {key}"),
                content: "body".to_string(),
            }),
        },
    );
    assert!(state.preview().is_some());
    state
}

#[test]
fn switching_away_from_files_closes_the_preview() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::File));
    let (state, _) = update(state, Msg::FilesAdded(vec![file_item("f1")]));
    let state = open_preview(state, "f1");

    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::Notion));
    assert_eq!(state.preview(), None);
    assert_eq!(state.source_type(), DataSourceType::Notion);
}

#[test]
fn switching_away_from_notion_closes_the_preview() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::Notion));
    let (state, _) = update(state, Msg::NotionPagesSelected(vec![page("p1")]));
    let state = open_preview(state, "p1");

    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::Web));
    assert_eq!(state.preview(), None);
    assert_eq!(select_view(&state).adapter, AdapterView::ComingSoon);
}

#[test]
fn reselecting_the_active_source_closes_the_preview_only() {
    init_logging();
    let (state, _) = update(mounted(true), Msg::SourceTypeSelected(DataSourceType::Notion));
    let (state, _) = update(state, Msg::NotionPagesSelected(vec![page("p1")]));
    let state = open_preview(state, "p1");

    let (state, _) = update(state, Msg::SourceTypeSelected(DataSourceType::Notion));
    assert_eq!(state.preview(), None);
    assert_eq!(state.source_type(), DataSourceType::Notion);
    assert_eq!(state.notion().page_ids(), vec!["p1".to_string()]);
    assert!(state.is_ready());
}
