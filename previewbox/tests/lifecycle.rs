use std::{collections::HashSet, sync::Arc};

use previewbox::{
    config::PreviewConfig,
    runtime::{MockCall, MockRuntime, MockUnitState, RuntimeOp, StreamEnd},
    sandbox::{LifecycleManager, SandboxRegistry},
    PreviewboxError,
};

//--------------------------------------------------------------------------------------------------
// Function: Helper
//--------------------------------------------------------------------------------------------------

fn setup() -> (Arc<MockRuntime>, LifecycleManager) {
    setup_with(PreviewConfig::default())
}

fn setup_with(config: PreviewConfig) -> (Arc<MockRuntime>, LifecycleManager) {
    let runtime = Arc::new(MockRuntime::new());
    let manager = LifecycleManager::new(
        runtime.clone(),
        Arc::new(SandboxRegistry::new()),
        config,
    )
    .unwrap();
    (runtime, manager)
}

fn is_timestamp_hostname(hostname: &str) -> bool {
    hostname
        .strip_prefix("app-")
        .and_then(|rest| rest.strip_suffix(".localhost"))
        .is_some_and(|stamp| !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit()))
}

//--------------------------------------------------------------------------------------------------
// Tests: Spawn
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn integration_test_spawn_registers_running_sandbox() -> anyhow::Result<()> {
    let (runtime, manager) = setup();

    let sandbox = manager.spawn().await?;

    assert_eq!(manager.registry().len().await, 1);
    assert!(manager.registry().contains(sandbox.get_id()).await);
    assert!(
        is_timestamp_hostname(sandbox.get_hostname()),
        "unexpected hostname {}",
        sandbox.get_hostname()
    );
    assert_eq!(
        sandbox.get_name().strip_prefix("react-app-"),
        sandbox.get_hostname()
            .strip_prefix("app-")
            .and_then(|h| h.strip_suffix(".localhost"))
    );
    assert!((5000..6000).contains(sandbox.get_port()));
    assert_eq!(
        runtime.unit_state(sandbox.get_id()).await,
        Some(MockUnitState::Running)
    );

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_spawned_ids_are_distinct_and_usable() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    runtime.set_exec_output(["ok"]).await;

    let mut ids = HashSet::new();
    let mut hostnames = HashSet::new();
    for _ in 0..20 {
        let sandbox = manager.spawn().await?;
        assert!(ids.insert(sandbox.get_id().clone()));
        assert!(hostnames.insert(sandbox.get_hostname().clone()));
    }

    for id in &ids {
        assert_eq!(manager.exec(id, "pwd").await?, "ok");
    }
    for id in &ids {
        manager.stop(id).await?;
    }
    assert!(manager.registry().is_empty().await);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_concurrent_spawns_do_not_collide() -> anyhow::Result<()> {
    let (_runtime, manager) = setup();
    let manager = Arc::new(manager);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.spawn().await })
        })
        .collect();

    let mut hostnames = HashSet::new();
    for handle in handles {
        let sandbox = handle.await??;
        assert!(hostnames.insert(sandbox.get_hostname().clone()));
    }
    assert_eq!(manager.registry().len().await, 16);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_spawn_create_failure_registers_nothing() {
    let (runtime, manager) = setup();
    runtime.fail_on(RuntimeOp::Create).await;

    let result = manager.spawn().await;

    assert!(matches!(result, Err(PreviewboxError::Provision(_))));
    assert_eq!(manager.registry().len().await, 0);
    assert!(!runtime
        .calls()
        .await
        .iter()
        .any(|c| matches!(c, MockCall::Start(_))));
}

//--------------------------------------------------------------------------------------------------
// Tests: Exec
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn integration_test_exec_concatenates_chunks_in_order() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    runtime
        .set_exec_output(["total 8\n", "drwxr-xr-x 2 node node ", "4096 .\n", "ls: warning\n"])
        .await;
    let sandbox = manager.spawn().await?;

    let output = manager.exec(sandbox.get_id(), "ls -la").await?;

    assert_eq!(
        output,
        "total 8\ndrwxr-xr-x 2 node node 4096 .\nls: warning\n"
    );
    assert_eq!(
        runtime.calls().await.last(),
        Some(&MockCall::Exec(
            sandbox.get_id().clone(),
            vec!["ls".to_string(), "-la".to_string()]
        ))
    );

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_joins_utf8_split_across_chunks() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    let bytes = "héllo".as_bytes();
    runtime
        .set_exec_output([bytes[..2].to_vec(), bytes[2..].to_vec()])
        .await;
    let sandbox = manager.spawn().await?;

    assert_eq!(manager.exec(sandbox.get_id(), "echo héllo").await?, "héllo");

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_rejects_disallowed_program_without_runtime_call(
) -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    let sandbox = manager.spawn().await?;
    let calls_before = runtime.calls().await.len();

    for command in ["rm -rf /", "sh -c 'ls'", "node -e 1", "", "sudo ls"] {
        let result = manager.exec(sandbox.get_id(), command).await;
        assert!(
            matches!(result, Err(PreviewboxError::CommandRejected(_))),
            "{command:?} was not rejected"
        );
    }

    assert_eq!(runtime.calls().await.len(), calls_before);
    assert_eq!(manager.registry().len().await, 1);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_unknown_id_is_not_found_without_runtime_call() {
    let (runtime, manager) = setup();

    let result = manager.exec("does-not-exist", "ls").await;

    assert!(matches!(result, Err(PreviewboxError::NotFound(id)) if id == "does-not-exist"));
    assert!(runtime.calls().await.is_empty());
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_unknown_id_wins_over_rejection() {
    let (_runtime, manager) = setup();

    let result = manager.exec("does-not-exist", "rm -rf /").await;

    assert!(matches!(result, Err(PreviewboxError::NotFound(_))));
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_runtime_failure_is_exec_error() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    let sandbox = manager.spawn().await?;
    runtime.fail_on(RuntimeOp::Exec).await;

    let result = manager.exec(sandbox.get_id(), "ls").await;

    assert!(matches!(result, Err(PreviewboxError::Exec { .. })));
    assert_eq!(manager.registry().len().await, 1);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_on_unit_gone_out_of_band_is_exec_error() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    let sandbox = manager.spawn().await?;
    runtime.remove_out_of_band(sandbox.get_id()).await;

    let result = manager.exec(sandbox.get_id(), "ls").await;

    assert!(matches!(result, Err(PreviewboxError::Exec { id, .. }) if &id == sandbox.get_id()));
    assert!(manager.registry().contains(sandbox.get_id()).await);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_stream_failure_is_exec_error() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    runtime.set_exec_output(["building...\n"]).await;
    runtime.set_exec_end(StreamEnd::Fail).await;
    let sandbox = manager.spawn().await?;

    let result = manager.exec(sandbox.get_id(), "npm run build").await;

    let Err(PreviewboxError::Exec { id, source }) = result else {
        panic!("expected exec error");
    };
    assert_eq!(&id, sandbox.get_id());
    assert!(matches!(*source, PreviewboxError::Custom(_)));
    assert_eq!(manager.list().await, vec![sandbox]);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_timeout_covers_stream_drain() -> anyhow::Result<()> {
    let (runtime, manager) = setup_with(PreviewConfig::builder().exec_timeout_secs(1).build());
    runtime.set_exec_output(["partial output"]).await;
    runtime.set_exec_end(StreamEnd::Hang).await;
    let sandbox = manager.spawn().await?;

    let result = manager.exec(sandbox.get_id(), "npm install").await;

    let Err(PreviewboxError::Exec { source, .. }) = result else {
        panic!("expected exec error");
    };
    assert!(matches!(
        *source,
        PreviewboxError::RuntimeTimeout {
            operation: "exec",
            ..
        }
    ));
    assert_eq!(manager.list().await, vec![sandbox]);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_exec_timeout_covers_setup() -> anyhow::Result<()> {
    let (runtime, manager) = setup_with(PreviewConfig::builder().exec_timeout_secs(1).build());
    let sandbox = manager.spawn().await?;
    runtime.hang_on(RuntimeOp::Exec).await;

    let result = manager.exec(sandbox.get_id(), "ls").await;

    assert!(matches!(
        result,
        Err(PreviewboxError::Exec { source, .. })
            if matches!(*source, PreviewboxError::RuntimeTimeout { operation: "exec", .. })
    ));
    assert!(manager.registry().contains(sandbox.get_id()).await);

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Tests: Stop
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn integration_test_stop_twice_is_success_then_not_found() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    let sandbox = manager.spawn().await?;

    manager.stop(sandbox.get_id()).await?;
    assert_eq!(manager.registry().len().await, 0);
    assert_eq!(runtime.unit_state(sandbox.get_id()).await, None);

    let second = manager.stop(sandbox.get_id()).await;
    assert!(matches!(second, Err(PreviewboxError::NotFound(_))));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_stop_swallows_runtime_failures() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    let sandbox = manager.spawn().await?;
    runtime.fail_on(RuntimeOp::Stop).await;
    runtime.fail_on(RuntimeOp::Remove).await;

    manager.stop(sandbox.get_id()).await?;

    assert!(manager.registry().is_empty().await);
    let calls = runtime.calls().await;
    assert!(calls.contains(&MockCall::Stop(sandbox.get_id().clone())));
    assert!(calls.contains(&MockCall::Remove(sandbox.get_id().clone())));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_stop_of_unit_already_gone_still_unregisters() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    let sandbox = manager.spawn().await?;
    runtime.remove_out_of_band(sandbox.get_id()).await;

    manager.stop(sandbox.get_id()).await?;

    assert!(manager.registry().is_empty().await);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_stop_unknown_id_has_no_side_effects() -> anyhow::Result<()> {
    let (runtime, manager) = setup();
    let sandbox = manager.spawn().await?;
    let calls_before = runtime.calls().await.len();

    let result = manager.stop("does-not-exist").await;

    assert!(matches!(result, Err(PreviewboxError::NotFound(_))));
    assert_eq!(runtime.calls().await.len(), calls_before);
    assert_eq!(manager.registry().list().await, vec![sandbox]);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_concurrent_stops_of_same_id() -> anyhow::Result<()> {
    let (_runtime, manager) = setup();
    let manager = Arc::new(manager);
    let id = manager.spawn().await?.get_id().clone();

    let (a, b) = tokio::join!(manager.stop(&id), manager.stop(&id));

    assert!(a.is_ok() || b.is_ok());
    for result in [a, b] {
        assert!(matches!(result, Ok(()) | Err(PreviewboxError::NotFound(_))));
    }
    assert!(manager.registry().is_empty().await);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn integration_test_failed_operations_do_not_disturb_other_sandboxes() -> anyhow::Result<()>
{
    let (runtime, manager) = setup();
    let keep = manager.spawn().await?;
    let other = manager.spawn().await?;

    runtime.fail_on(RuntimeOp::Create).await;
    assert!(manager.spawn().await.is_err());
    assert!(manager.exec(other.get_id(), "rm x").await.is_err());
    manager.stop(other.get_id()).await?;

    assert_eq!(manager.list().await, vec![keep.clone()]);
    assert_eq!(manager.get(keep.get_id()).await?, keep);

    Ok(())
}
