use bios_chain::ChainClient;
use bios_core::constants::SYSTEM_ACCOUNT;
use bios_core::{AccountInfo, AccountName, BiosError};
use bios_genesis::{decode_kickstart, KickstartPayload};
use bios_hooks::{HookDispatcher, HookEvent};
use tracing::{debug, info, warn};

use crate::context::LaunchContext;
use crate::input::KickstartSource;

/// Read one block of kickstart text and decode it.
///
/// Fails with `MalformedHandoff` or `InvalidKey`; there is no retry.
pub async fn wait_for_kickstart(
    input: &mut dyn KickstartSource,
) -> Result<KickstartPayload, BiosError> {
    let text = input.read_block().await?;
    let payload = decode_kickstart(&text)?;
    info!(
        bios_p2p_address = %payload.bios_p2p_address,
        public_key_used = %payload.public_key_used,
        "kickstart data received"
    );
    Ok(payload)
}

/// The boot node has locked itself out once the account has exactly two
/// permissions (owner and active) and both require a threshold of 0.
pub fn is_disabled(account: &AccountInfo) -> bool {
    account.permissions.len() == 2
        && account
            .permissions
            .iter()
            .all(|p| p.required_auth.threshold == 0)
}

/// Appointed-producer stage: connect to the boot node, then wait until the
/// system account is disabled.
///
/// Polls forever; read errors count as "not yet".
pub async fn run_appointed_producer(
    ctx: &LaunchContext,
    chain: &dyn ChainClient,
    hooks: &dyn HookDispatcher,
    input: &mut dyn KickstartSource,
) -> Result<KickstartPayload, BiosError> {
    let kickstart = wait_for_kickstart(input).await?;
    let my_producer_defs = ctx.my_producer_defs()?;
    info!(identities = my_producer_defs.len(), "connecting as appointed block producer");

    hooks
        .dispatch(&HookEvent::ConnectAsAbp {
            kickstart_data: kickstart.clone(),
            my_producer_defs,
        })
        .await?;

    println!("Waiting for the boot node to disable the system account...");
    wait_system_disabled(chain, ctx.poll_interval).await;
    println!("System account disabled. OKAY");
    Ok(kickstart)
}

async fn wait_system_disabled(chain: &dyn ChainClient, interval: std::time::Duration) {
    let system = AccountName::from(SYSTEM_ACCOUNT);
    let mut attempt: u64 = 0;
    loop {
        tokio::time::sleep(interval).await;
        attempt += 1;
        match chain.get_account(&system).await {
            Ok(account) if is_disabled(&account) => {
                info!(attempt, "system account disabled");
                return;
            }
            Ok(_) => debug!(attempt, "system account still active"),
            Err(e) => warn!(attempt, error = %e, "reading system account failed, retrying"),
        }
    }
}

/// Participant stage: connect as the local producer and return. No
/// verification happens here.
pub async fn run_participant(
    ctx: &LaunchContext,
    hooks: &dyn HookDispatcher,
    input: &mut dyn KickstartSource,
) -> Result<KickstartPayload, BiosError> {
    let kickstart = wait_for_kickstart(input).await?;
    let my_producer_def = ctx
        .my_producer_defs()?
        .into_iter()
        .next()
        .ok_or_else(|| BiosError::UnknownProducer(ctx.local_account().to_string()))?;

    hooks
        .dispatch(&HookEvent::ConnectAsParticipant {
            kickstart_data: kickstart.clone(),
            my_producer_def,
        })
        .await?;

    println!("Not doing any validation, the appointed block producers have done it.");
    Ok(kickstart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::input::TextKickstartSource;
    use crate::testing::{config_for, launch_data, seed};
    use bios_chain::MemoryChain;
    use bios_core::{Authority, Permission, Snapshot};
    use bios_crypto::KeyPair;
    use bios_genesis::{encode_kickstart, GenesisDescriptor};
    use bios_hooks::MemoryHooks;

    fn perm(name: &str, threshold: u32) -> Permission {
        Permission {
            perm_name: name.into(),
            parent: String::new(),
            required_auth: Authority {
                threshold,
                ..Authority::default()
            },
        }
    }

    fn system(perms: Vec<Permission>) -> AccountInfo {
        AccountInfo {
            account_name: SYSTEM_ACCOUNT.into(),
            permissions: perms,
        }
    }

    fn kickstart_text() -> String {
        let kp = KeyPair::generate();
        let genesis = GenesisDescriptor::new(seed().time, &kp.public_key, &[1; 32]);
        encode_kickstart(&KickstartPayload::new(
            "10.0.0.1:9876",
            &kp.public_key,
            &kp.private_key,
            &genesis,
        ))
    }

    fn ctx(account: &str) -> LaunchContext {
        LaunchContext::new(config_for(account), launch_data(5), Snapshot::default(), &seed())
            .unwrap()
            .with_poll_interval(Duration::from_millis(1))
    }

    #[test]
    fn disabled_means_two_zero_thresholds() {
        assert!(is_disabled(&system(vec![perm("owner", 0), perm("active", 0)])));
        assert!(!is_disabled(&system(vec![perm("owner", 0), perm("active", 1)])));
        assert!(!is_disabled(&system(vec![perm("owner", 0)])));
        assert!(!is_disabled(&system(vec![
            perm("owner", 0),
            perm("active", 0),
            perm("extra", 0)
        ])));
    }

    #[tokio::test]
    async fn appointed_producer_waits_through_read_errors() {
        let ctx = ctx("producer01");
        let system_key = KeyPair::generate();
        let chain = MemoryChain::new(vec![1; 32], &system_key.public_key);
        let handle = chain.handle();
        handle.set_account(system(vec![perm("owner", 0), perm("active", 0)]));
        handle.fail_reads(3);
        let hooks = MemoryHooks::new();
        let mut input = TextKickstartSource::new(kickstart_text());

        run_appointed_producer(&ctx, &chain, &hooks, &mut input).await.unwrap();

        let events = hooks.events();
        match &events[0] {
            HookEvent::ConnectAsAbp { my_producer_defs, .. } => {
                let names: Vec<&str> = my_producer_defs.iter().map(|p| p.account_name.as_str()).collect();
                assert_eq!(names[0], "producer01");
                assert!(names[1..].iter().all(|n| n.starts_with("producer01.")));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn appointed_producer_keeps_polling_while_active() {
        let ctx = ctx("producer01");
        let system_key = KeyPair::generate();
        let chain = MemoryChain::new(vec![1; 32], &system_key.public_key);
        let hooks = MemoryHooks::new();
        let mut input = TextKickstartSource::new(kickstart_text());

        let waited = tokio::time::timeout(
            Duration::from_millis(50),
            run_appointed_producer(&ctx, &chain, &hooks, &mut input),
        )
        .await;
        assert!(waited.is_err(), "returned while the system account was active");
        assert_eq!(hooks.keys(), vec!["connect_as_abp"]);
    }

    #[tokio::test]
    async fn malformed_kickstart_is_fatal() {
        let ctx = ctx("producer01");
        let hooks = MemoryHooks::new();
        let mut input = TextKickstartSource::new("!!! not base64 !!!");
        let err = run_participant(&ctx, &hooks, &mut input).await.unwrap_err();
        assert!(matches!(err, BiosError::MalformedHandoff(_)));
        assert!(hooks.events().is_empty());
    }

    #[tokio::test]
    async fn participant_connects_with_its_own_entry() {
        let ctx = LaunchContext::new(config_for("producer30"), launch_data(31), Snapshot::default(), &seed())
            .unwrap();
        let hooks = MemoryHooks::new();
        let mut input = TextKickstartSource::new(kickstart_text());

        let kickstart = run_participant(&ctx, &hooks, &mut input).await.unwrap();

        assert_eq!(kickstart.bios_p2p_address, "10.0.0.1:9876");
        match &hooks.events()[0] {
            HookEvent::ConnectAsParticipant { my_producer_def, .. } => {
                assert_eq!(my_producer_def.account_name.as_str(), "producer30");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
