use call_control::{EndPoint, Originate, OriginatePhase, OriginateRequest, OriginateResult};
use std::time::Duration;
use tokio::task::JoinHandle;

pub(crate) const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn request_to(extension: &str) -> OriginateRequest {
    OriginateRequest::new(
        EndPoint::new("SIP", "100"),
        EndPoint::extension(extension),
        "default",
    )
    .with_timeout(DIAL_TIMEOUT)
}

pub(crate) fn spawn_originate(
    originate: &Originate,
    request: OriginateRequest,
) -> JoinHandle<Option<OriginateResult>> {
    let originate = originate.clone();
    tokio::spawn(async move { originate.originate(request).await })
}

/// Waits until the operation has dialed and returns its correlation token.
pub(crate) async fn wait_for_token(originate: &Originate) -> String {
    loop {
        if let Some(token) = originate.correlation_token().await {
            return token;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[allow(dead_code)]
pub(crate) async fn wait_for_phase(originate: &Originate, phase: OriginatePhase) {
    while originate.phase().await != phase {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

pub(crate) async fn join_result(
    handle: JoinHandle<Option<OriginateResult>>,
) -> OriginateResult {
    handle
        .await
        .expect("originate task should not panic")
        .expect("originate should dial")
}
