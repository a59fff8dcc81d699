use periodic::{Signal, serve, sleep, sleep_detached};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Instant;
use time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn task_cancels_its_own_loop() {
    init_tracing();

    let cancel = Signal::new();
    let done = Signal::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let server = {
        let task_cancel = cancel.clone();
        let done = done.clone();
        let calls = calls.clone();
        serve(
            Duration::milliseconds(1),
            move || {
                let cancel = task_cancel.clone();
                let done = done.clone();
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    cancel.try_send(true).unwrap();
                    done.try_send(true).unwrap();
                }
            },
            Some(cancel.clone()),
        )
    };

    assert!(done.recv().await.unwrap());
    assert_eq!(server.join().await.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn long_sleep_cancelled_from_another_task() {
    init_tracing();

    let cancel = Signal::rendezvous();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        canceller.send(true).await.unwrap();
    });

    let start = Instant::now();
    let completed = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        sleep(Duration::minutes(1), Some(&cancel)),
    )
    .await
    .expect("sleep was not cancelled in time");

    assert!(!completed);
    assert!(start.elapsed() < std::time::Duration::from_secs(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn detached_sleep_cancelled_after_delay() {
    init_tracing();

    let sleeper = sleep_detached(Duration::minutes(1), None, None);
    let cancel = sleeper.cancel().clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        cancel.try_send(true).unwrap();
    });

    assert!(!sleeper.result().await.unwrap());
    sleeper.join().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loop_runs_several_periods_then_stops() {
    init_tracing();

    let calls = Arc::new(AtomicUsize::new(0));
    let server = {
        let calls = calls.clone();
        serve(
            Duration::milliseconds(10),
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                }
            },
            None,
        )
    };

    // Comfortably more than 3 periods
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let invocations = server.stop().await.unwrap();
    assert!(invocations >= 3);
    assert_eq!(invocations as usize, calls.load(Ordering::SeqCst));
}
