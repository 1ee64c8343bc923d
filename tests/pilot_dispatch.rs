//! Dispatcher-level integration: key chords arriving at an in-memory
//! document turn into serialized navigation workflows.

use std::sync::Arc;

use dom_bridge::{ActivationKind, DomPort, MemDom};
use gallery_flows::heuristics::DIALOG_CHANGE_BUDGET;
use gallerypilot::{KeyChord, Pilot};

const LEFT_CARET: &str = "M15.41 16.09l-4.58-4.59 4.58-4.59L14 5.5l-6 6 6 6z";
const RIGHT_CARET: &str = "M8.59 16.34l4.58-4.59-4.58-4.59L10 5.75l6 6-6 6z";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn arrow(dom: &MemDom, d: &str) -> gallerypilot::NodeId {
    let button = dom.append_element(dom.root(), "div");
    dom.set_attribute(button, "role", "button");
    dom.set_attribute(button, "jsaction", "JqEhuc;click:h5M12e");
    let svg = dom.append_element(button, "svg");
    let path = dom.append_element(svg, "path");
    dom.set_attribute(path, "d", d);
    button
}

#[tokio::test]
async fn chords_run_as_serialized_navigations() {
    init_tracing();
    let dom = MemDom::new();
    let container = dom.append_element(dom.root(), "main");
    let cwiz = dom.append_element(container, "c-wiz");
    let input = dom.append_element(cwiz, "input");
    dom.focus(input).await.unwrap();
    let left = arrow(&dom, LEFT_CARET);
    let right = arrow(&dom, RIGHT_CARET);
    let mut activations = dom.activations();

    // The host's side: each click rebuilds the view.
    let driver = tokio::spawn({
        let dom = dom.clone();
        async move {
            let mut clicked = Vec::new();
            let mut old = cwiz;
            for _ in 0..2 {
                let ev = activations.recv().await.unwrap();
                assert_eq!(ev.kind, ActivationKind::Click);
                clicked.push(ev.node);

                dom.until_watched(container).await;
                let fresh = dom.element("c-wiz");
                let fresh_input = dom.element("input");
                dom.append(fresh, fresh_input);
                dom.append(container, fresh);
                dom.remove(old);
                old = fresh;
            }
            (clicked, old)
        }
    });

    let pilot = Pilot::new(Arc::new(dom.clone()) as Arc<dyn DomPort>);
    assert!(pilot.handle_key(input, &KeyChord::ctrl("]")).await.unwrap());
    assert!(pilot.handle_key(input, &KeyChord::ctrl("[")).await.unwrap());
    pilot.drained().await;

    let (clicked, last_view) = driver.await.unwrap();
    // Enqueue order is execution order: forward first, then back.
    assert_eq!(clicked, vec![right, left]);
    let focused = dom.focused().await.unwrap().unwrap();
    assert_eq!(dom.tag(focused).await.unwrap(), "input");
    assert!(dom
        .children(last_view)
        .await
        .unwrap()
        .contains(&focused));
}

#[tokio::test]
async fn cancelled_dialog_does_not_strand_the_chain_by_default() {
    init_tracing();
    let dom = MemDom::new();
    let container = dom.append_element(dom.root(), "main");
    let cwiz = dom.append_element(container, "c-wiz");
    let input = dom.append_element(cwiz, "input");
    dom.focus(input).await.unwrap();
    let trigger = dom.append_element(dom.root(), "div");
    dom.set_attribute(trigger, "aria-label", "More options");
    let mut activations = dom.activations();
    let root = dom.root();

    let driver = tokio::spawn({
        let dom = dom.clone();
        async move {
            // Trigger clicked; host opens the overflow menu.
            let _ = activations.recv().await.unwrap();
            dom.until_watched(root).await;
            let menu = dom.element("div");
            dom.set_attribute(menu, "role", "menu");
            let labels = [
                ("Share", None),
                ("Download", Some("Shift+D")),
                ("Download original", None),
                ("Add to album", None),
                ("Delete", None),
            ];
            for (label, shortcut) in labels {
                let item = dom.element("div");
                dom.set_attribute(item, "role", "menuitem");
                dom.set_text(item, label);
                if let Some(accel) = shortcut {
                    dom.set_attribute(item, "aria-keyshortcuts", accel);
                }
                dom.append(menu, item);
            }
            dom.append(root, menu);

            // Entry pressed; host closes the menu and shows the dialog.
            let _ = activations.recv().await.unwrap();
            dom.remove(menu);
            dom.until_watched(root).await;
            let dialog = dom.element("div");
            dom.set_attribute(dialog, "role", "dialog");
            let list = dom.element("div");
            dom.set_attribute(list, "role", "listbox");
            dom.append(dialog, list);
            dom.append(root, dialog);

            // Dialog dismissed without a change; no replacement ever
            // appears, only unrelated churn.
            dom.until_watched(root).await;
            dom.remove(dialog);
            for tick in 0..DIALOG_CHANGE_BUDGET {
                dom.until_watched(container).await;
                dom.set_attribute(container, "data-tick", &tick.to_string());
            }
        }
    });

    let pilot = Pilot::new(Arc::new(dom.clone()) as Arc<dyn DomPort>);
    assert!(pilot.handle_key(input, &KeyChord::ctrl("'")).await.unwrap());
    // Without the bounded default this would never return.
    pilot.drained().await;
    driver.await.unwrap();

    assert_eq!(dom.focused().await.unwrap(), Some(input));
}

#[tokio::test]
async fn events_outside_the_contract_pass_through() {
    init_tracing();
    let dom = MemDom::new();
    let container = dom.append_element(dom.root(), "main");
    let cwiz = dom.append_element(container, "c-wiz");
    let input = dom.append_element(cwiz, "input");
    dom.focus(input).await.unwrap();
    arrow(&dom, RIGHT_CARET);
    let mut activations = dom.activations();

    let pilot = Pilot::new(Arc::new(dom.clone()) as Arc<dyn DomPort>);

    // Unrecognized key.
    assert!(!pilot.handle_key(input, &KeyChord::ctrl("x")).await.unwrap());
    // Right chord, wrong modifiers.
    let mut chord = KeyChord::ctrl("]");
    chord.shift = true;
    assert!(!pilot.handle_key(input, &chord).await.unwrap());
    // Right chord, but the event targets a non-input element.
    assert!(!pilot
        .handle_key(container, &KeyChord::ctrl("]"))
        .await
        .unwrap());

    pilot.drained().await;
    assert!(activations.try_recv().is_err());
}
