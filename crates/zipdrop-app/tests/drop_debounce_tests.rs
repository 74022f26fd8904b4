//! Integration tests for drop debouncing through the event loop.

mod common;

use std::time::Duration;

use zipdrop_intake::{ChannelDragSource, DragEvent};
use zipdrop_remote::Invocation;

#[tokio::test(start_paused = true)]
async fn drop_debounce_tests_second_drop_inside_window_is_ignored() {
    let backend = common::cloud_backend();
    backend.push_process_result(Ok(common::cloud_outcome("a", "webp")));
    backend.push_process_result(Ok(common::cloud_outcome("c", "webp")));
    let source = ChannelDragSource::new();
    let mut runtime = common::runtime(&backend);
    runtime.attach_drag_source(&source).expect("drag source should attach");

    source.emit(DragEvent::drop_paths(["/home/u/a.png"]));
    runtime.run_for(Duration::from_millis(100)).await;
    source.emit(DragEvent::drop_paths(["/home/u/b.png"]));
    runtime.run_for(Duration::from_millis(400)).await;
    source.emit(DragEvent::drop_paths(["/home/u/c.png"]));
    runtime.run_for(Duration::from_millis(100)).await;

    let forwarded: Vec<Vec<String>> = backend
        .invocations()
        .into_iter()
        .filter_map(|call| match call {
            Invocation::ProcessAndUpload(paths) => Some(paths),
            _ => None,
        })
        .collect();
    assert_eq!(
        forwarded,
        vec![
            vec!["/home/u/a.png".to_string()],
            vec!["/home/u/c.png".to_string()],
        ]
    );
    assert_eq!(runtime.app().history().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn drop_debounce_tests_empty_drop_is_ignored() {
    let backend = common::cloud_backend();
    let source = ChannelDragSource::new();
    let mut runtime = common::runtime(&backend);
    runtime.attach_drag_source(&source).expect("drag source should attach");

    source.emit(DragEvent::drop_paths(Vec::<String>::new()));
    runtime.run_for(Duration::from_millis(10)).await;

    assert_eq!(
        backend.count(|call| matches!(call, Invocation::ProcessAndUpload(_))),
        0
    );
    assert_eq!(
        runtime.app().session().state(),
        zipdrop_session::SessionState::Idle
    );
}
