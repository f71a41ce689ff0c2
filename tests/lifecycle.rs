use first_opengl::interface::headless::HeadlessPlatform;
use first_opengl::{run, Error, RunSummary};

fn run_headless(platform: &mut HeadlessPlatform) -> (Result<RunSummary, Error>, String) {
    let mut out = Vec::new();
    let result = run(platform, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn closed_after_ten_frames() {
    let mut platform = HeadlessPlatform::new().close_after(10);
    let (result, out) = run_headless(&mut platform);

    assert_eq!(result, Ok(RunSummary { frames: 10 }));
    assert!(out.is_empty());
    assert_eq!(platform.gpu().count_calls("draw_arrays"), 10);
}

#[test]
fn window_creation_failure() {
    let mut platform = HeadlessPlatform::new().failing_window_creation();
    let (result, out) = run_headless(&mut platform);

    assert_eq!(result, Err(Error::WindowCreation));
    assert_eq!(out, "Failed to create window\n");
    assert_eq!(platform.calls().last(), Some(&"terminate"));
    assert_eq!(platform.count_calls("load_gpu"), 0);
    assert!(platform.gpu().calls().is_empty());
}

#[test]
fn init_failure_takes_the_diagnostic_path() {
    let mut platform = HeadlessPlatform::new().failing_init();
    let (result, out) = run_headless(&mut platform);

    assert_eq!(result, Err(Error::WindowCreation));
    assert_eq!(out, "Failed to create window\n");
    assert_eq!(platform.calls().last(), Some(&"terminate"));
    assert_eq!(platform.count_calls("load_gpu"), 0);
    assert!(platform.gpu().calls().is_empty());
    assert!(!platform.is_initialized());
}

#[test]
fn context_failure_closes_the_window_before_terminating() {
    let mut platform = HeadlessPlatform::new().failing_make_current();
    let (result, out) = run_headless(&mut platform);

    assert_eq!(result, Err(Error::WindowCreation));
    assert_eq!(out, "Failed to create window\n");
    assert_eq!(
        &platform.calls()[platform.calls().len() - 2..],
        &["destroy_window", "terminate"]
    );
    assert_eq!(platform.live_windows(), 0);
    assert!(platform.gpu().calls().is_empty());
}

#[test]
fn one_frame_swaps_twice() {
    let mut platform = HeadlessPlatform::new().close_after(1);
    let (result, _) = run_headless(&mut platform);

    assert_eq!(result, Ok(RunSummary { frames: 1 }));
    assert_eq!(platform.count_calls("swap_buffers"), 2);
}

#[test]
fn priming_frame_is_cleared_and_swapped_before_the_loop() {
    let mut platform = HeadlessPlatform::new().close_after(1);
    run_headless(&mut platform).0.unwrap();

    let calls = platform.calls();
    let first_swap = calls.iter().position(|c| *c == "swap_buffers").unwrap();
    let first_poll = calls.iter().position(|c| *c == "poll_events").unwrap();
    assert!(first_swap < first_poll);

    let gpu_calls = platform.gpu().calls();
    let first_clear = gpu_calls.iter().position(|c| *c == "clear").unwrap();
    let first_draw = gpu_calls.iter().position(|c| *c == "draw_arrays").unwrap();
    let clears_before_draw = gpu_calls[..first_draw].iter().filter(|c| **c == "clear").count();
    assert!(first_clear < first_draw);
    assert_eq!(clears_before_draw, 2);
}

#[test]
fn exits_within_one_frame_of_close() {
    for frames in [1, 3, 7].iter() {
        let mut platform = HeadlessPlatform::new().close_after(*frames);
        let (result, _) = run_headless(&mut platform);

        assert_eq!(result, Ok(RunSummary { frames: *frames }));
        assert_eq!(platform.count_calls("poll_events"), *frames);
        assert_eq!(platform.count_calls("swap_buffers"), *frames + 1);
    }
}

#[test]
fn every_object_is_deleted_and_runs_repeat_cleanly() {
    let mut platform = HeadlessPlatform::new().close_after(2);

    for _ in 0..2 {
        let (result, _) = run_headless(&mut platform);
        assert!(result.is_ok());

        let gpu = platform.gpu();
        assert_eq!(gpu.live_objects(), 0);
        assert_eq!(gpu.count_calls("gen_vertex_array"), gpu.count_calls("delete_vertex_array"));
        assert_eq!(gpu.count_calls("gen_buffer"), gpu.count_calls("delete_buffer"));
        assert_eq!(gpu.count_calls("create_program"), gpu.count_calls("delete_program"));
        assert_eq!(gpu.count_calls("create_shader"), gpu.count_calls("delete_shader"));
        assert_eq!(platform.live_windows(), 0);
        assert!(!platform.is_initialized());
    }

    assert_eq!(platform.gpu().count_calls("gen_vertex_array"), 2);
}

#[test]
fn teardown_runs_in_reverse_order() {
    let mut platform = HeadlessPlatform::new().close_after(1);
    run_headless(&mut platform).0.unwrap();

    let gpu_calls = platform.gpu().calls();
    assert_eq!(
        &gpu_calls[gpu_calls.len() - 3..],
        &["delete_vertex_array", "delete_buffer", "delete_program"]
    );

    let calls = platform.calls();
    assert_eq!(&calls[calls.len() - 2..], &["destroy_window", "terminate"]);
}
