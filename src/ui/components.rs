/// Injected UI pieces: the folder picker, toasts and control styling

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use gloo_timers::callback::Timeout;
use patternfly_yew::prelude::{Alert, AlertType, Button, ButtonVariant};
use wasm_bindgen::JsValue;
use web_sys::Element;
use yew::prelude::*;

use crate::controls::{ControlScheme, ControlView};
use crate::error::ShelfError;
use crate::modal::{kind_heading, ConfirmMode, FolderRequest, Selection, SelectionEvent};
use crate::shelf::NoticeKind;
use crate::world_data::FolderKind;

const MODAL_HOST_CLASS: &str = "world-shelf-modal-host";
const TOAST_STACK_ID: &str = "world-shelf-toasts";

/// Inline style for one injected control
pub fn control_style(view: &ControlView) -> String {
    let base = "flex: 1; padding: 6px 8px; border: none; border-radius: 4px; font-size: 12px; font-weight: 500; cursor: pointer; white-space: nowrap; transition: background-color 0.2s;";

    let scheme = match view.scheme {
        ControlScheme::Neutral => "background-color: #3a3f47; color: #e8e8e8;",
        ControlScheme::Affirmative => "background-color: #2e7d32; color: white;",
        ControlScheme::Destructive => "background-color: #c62828; color: white;",
        ControlScheme::Confirming => "background-color: #ef6c00; color: white;",
    };

    let state = if view.placeholder {
        "visibility: hidden; cursor: default;"
    } else if view.busy {
        "opacity: 0.6; cursor: progress;"
    } else {
        ""
    };

    format!("{} {} {}", base, scheme, state)
}

fn folder_class(kind: FolderKind, selected: bool) -> String {
    let kind = match kind {
        FolderKind::Unfiled => "unfiled",
        FolderKind::Local => "local",
        FolderKind::Remote => "remote",
    };
    if selected {
        format!("world-shelf-folder world-shelf-folder--{} is-selected", kind)
    } else {
        format!("world-shelf-folder world-shelf-folder--{}", kind)
    }
}

#[derive(Properties, PartialEq)]
pub struct FolderModalProps {
    pub request: FolderRequest,
    /// Fired exactly once: the chosen folder or `ShelfError::Cancelled`
    pub on_done: Callback<Result<String, ShelfError>>,
}

#[function_component(FolderModal)]
pub fn folder_modal(props: &FolderModalProps) -> Html {
    let selection = use_state(|| Selection::new(props.request.mode));

    let apply = {
        let selection = selection.clone();
        let on_done = props.on_done.clone();
        move |next: Selection, event: SelectionEvent| match event {
            SelectionEvent::Confirmed(folder_id) => on_done.emit(Ok(folder_id)),
            SelectionEvent::Selected(_) => selection.set(next),
            SelectionEvent::Ignored => {}
        }
    };

    let on_cancel = {
        let on_done = props.on_done.clone();
        Callback::from(move |_: MouseEvent| on_done.emit(Err(ShelfError::Cancelled)))
    };

    // Clicks inside the dialog must not reach the backdrop
    let on_dialog_click = Callback::from(|e: MouseEvent| e.stop_propagation());

    let on_confirm = {
        let selection = selection.clone();
        let apply = apply.clone();
        Callback::from(move |_: MouseEvent| {
            let next = (*selection).clone();
            let event = next.confirm();
            apply(next, event);
        })
    };

    let folder_row = |folder_id: String, name: String, kind: FolderKind| {
        let is_selected = selection.selected() == Some(folder_id.as_str());
        let onclick = {
            let selection = selection.clone();
            let apply = apply.clone();
            let folder_id = folder_id.clone();
            Callback::from(move |_: MouseEvent| {
                let mut next = (*selection).clone();
                let event = next.click(&folder_id);
                apply(next, event);
            })
        };
        let ondblclick = {
            let selection = selection.clone();
            let apply = apply.clone();
            Callback::from(move |_: MouseEvent| {
                let mut next = (*selection).clone();
                let event = next.double_click(&folder_id);
                apply(next, event);
            })
        };

        html! {
            <div class={folder_class(kind, is_selected)} {onclick} {ondblclick}>
                {name}
            </div>
        }
    };

    let groups = props.request.grouped();

    html! {
        <div class="world-shelf-backdrop" onclick={on_cancel.clone()}
             style="position: fixed; inset: 0; background: rgba(0, 0, 0, 0.6); display: flex; align-items: center; justify-content: center; z-index: 10000;">
            <div class="world-shelf-dialog" onclick={on_dialog_click}
                 style="background: #1f2329; color: #e8e8e8; border-radius: 8px; padding: 20px; min-width: 320px; max-height: 80vh; overflow-y: auto;">
                <h2 class="world-shelf-dialog-title">{&props.request.title}</h2>
                <p class="world-shelf-dialog-description">{&props.request.description}</p>

                if groups.is_empty() {
                    <p class="world-shelf-empty">{"No folders available"}</p>
                }

                {for groups.into_iter().map(|(kind, folders)| html! {
                    <div class="world-shelf-folder-group">
                        <h3 class="world-shelf-folder-heading">{kind_heading(kind)}</h3>
                        {for folders.into_iter().map(|f| folder_row(f.id.clone(), f.name.clone(), f.kind))}
                    </div>
                })}

                <div class="world-shelf-dialog-actions" style="display: flex; gap: 8px; margin-top: 16px;">
                    if props.request.mode == ConfirmMode::Explicit {
                        <Button onclick={on_confirm} disabled={selection.selected().is_none()} variant={ButtonVariant::Primary} block={true}>
                            {"Save"}
                        </Button>
                    }
                    <Button onclick={on_cancel} variant={ButtonVariant::Secondary} block={true}>
                        {"Cancel"}
                    </Button>
                </div>
            </div>
        </div>
    }
}

fn body() -> Result<web_sys::HtmlElement, ShelfError> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .ok_or_else(|| ShelfError::Rejected("page has no body".to_string()))
}

fn dom_error(e: JsValue) -> ShelfError {
    ShelfError::Rejected(format!("DOM error: {:?}", e))
}

fn create_host(class: &str) -> Result<Element, ShelfError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ShelfError::Rejected("page has no document".to_string()))?;
    let host = document.create_element("div").map_err(dom_error)?;
    host.set_class_name(class);
    Ok(host)
}

/// Mount a folder picker and wait for the user to choose or dismiss it
pub async fn open_folder_modal(request: FolderRequest) -> Result<String, ShelfError> {
    let host = create_host(MODAL_HOST_CLASS)?;
    body()?.append_child(&host).map_err(dom_error)?;

    let (sender, receiver) = oneshot::channel::<Result<String, ShelfError>>();
    let sender = Rc::new(RefCell::new(Some(sender)));
    let on_done = Callback::from(move |result: Result<String, ShelfError>| {
        if let Some(sender) = sender.borrow_mut().take() {
            let _ = sender.send(result);
        }
    });

    let handle = yew::Renderer::<FolderModal>::with_root_and_props(
        host.clone(),
        FolderModalProps { request, on_done },
    )
    .render();

    let result = receiver.await.unwrap_or(Err(ShelfError::Cancelled));

    handle.destroy();
    host.remove();
    result
}

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub kind: NoticeKind,
    pub message: String,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let alert_type = match props.kind {
        NoticeKind::Success => AlertType::Success,
        NoticeKind::Info => AlertType::Info,
        NoticeKind::Error => AlertType::Danger,
    };

    html! {
        <Alert r#type={alert_type} title={props.message.clone()} inline={true}>
        </Alert>
    }
}

fn toast_stack() -> Result<Element, ShelfError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ShelfError::Rejected("page has no document".to_string()))?;
    if let Some(stack) = document.get_element_by_id(TOAST_STACK_ID) {
        return Ok(stack);
    }

    let stack = document.create_element("div").map_err(dom_error)?;
    stack.set_id(TOAST_STACK_ID);
    stack
        .set_attribute(
            "style",
            "position: fixed; right: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 8px; max-width: 360px; z-index: 10001;",
        )
        .map_err(dom_error)?;
    body()?.append_child(&stack).map_err(dom_error)?;
    Ok(stack)
}

/// Show a transient notification; it removes itself after `duration_ms`
pub fn show_toast(kind: NoticeKind, message: &str, duration_ms: u32) {
    let mounted = toast_stack().and_then(|stack| {
        let host = create_host("world-shelf-toast")?;
        stack.append_child(&host).map_err(dom_error)?;
        Ok(host)
    });

    let host = match mounted {
        Ok(host) => host,
        Err(e) => {
            log::warn!("could not show notice \"{}\": {}", message, e);
            return;
        }
    };

    let handle = yew::Renderer::<Toast>::with_root_and_props(
        host.clone(),
        ToastProps {
            kind,
            message: message.to_string(),
        },
    )
    .render();

    Timeout::new(duration_ms, move || {
        handle.destroy();
        host.remove();
    })
    .forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(scheme: ControlScheme) -> ControlView {
        ControlView {
            label: "x".to_string(),
            title: String::new(),
            scheme,
            busy: false,
            placeholder: false,
        }
    }

    #[test]
    fn test_control_style_per_scheme() {
        assert!(control_style(&view(ControlScheme::Affirmative)).contains("#2e7d32"));
        assert!(control_style(&view(ControlScheme::Destructive)).contains("#c62828"));
        assert!(control_style(&view(ControlScheme::Confirming)).contains("#ef6c00"));
    }

    #[test]
    fn test_control_style_busy_and_placeholder() {
        let busy = ControlView {
            busy: true,
            ..view(ControlScheme::Neutral)
        };
        assert!(control_style(&busy).contains("cursor: progress"));

        let placeholder = ControlView {
            placeholder: true,
            ..view(ControlScheme::Neutral)
        };
        assert!(control_style(&placeholder).contains("visibility: hidden"));
    }

    #[test]
    fn test_folder_class() {
        assert_eq!(
            folder_class(FolderKind::Remote, false),
            "world-shelf-folder world-shelf-folder--remote"
        );
        assert!(folder_class(FolderKind::Local, true).ends_with("is-selected"));
    }
}
