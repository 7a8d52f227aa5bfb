use serde_json::Map;
use tracing::{info, instrument};

use rwl_model::{
    CreateInstanceSpec, DiskSpec, DiskTemplate, DryRun, GrowDiskSpec, ModifyInstanceSpec, NicSpec,
    Op, PowerOptions, RebootKind, RebootOptions, RecreateDisksSpec, ReinstallSpec, RenameOptions,
};

use crate::{
    resolver::JobResolver,
    scenario::tags::{TagScope, run_tags},
};

/// OS image every test instance is created with.
pub const INSTANCE_OS: &str = "debian-image";

/// Names the instance scenario works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTargets<'a> {
    /// Hostname of the instance under test.
    pub instance: &'a str,
    /// Second valid hostname, used for the rename round trip.
    pub alternate: &'a str,
    /// Primary node of the instance.
    pub node_one: &'a str,
    /// Mirror node for the drbd conversion.
    pub node_two: &'a str,
}

fn creation(t: &LifecycleTargets<'_>, disk: DiskSpec, nics: Vec<NicSpec>) -> CreateInstanceSpec {
    CreateInstanceSpec::create(t.instance, DiskTemplate::Plain, vec![disk], nics)
        .with_os(INSTANCE_OS)
        .with_pnode(t.node_one)
}

/// Creates one instance, walks it through every instance operation and
/// deletes it again.
#[instrument(level = "info", skip_all, fields(instance = t.instance))]
pub async fn run_instance_lifecycle(resolver: &JobResolver<'_>, t: LifecycleTargets<'_>) {
    let rapi = resolver.rapi();
    let name = t.instance;

    // Dry runs: size with a unit, then a numeric string.
    let spec = creation(&t, DiskSpec::new("1gb"), Vec::new());
    resolver
        .finish(Op::CreateInstance, rapi.create_instance(&spec, DryRun::enabled()))
        .await;
    let spec = creation(&t, DiskSpec::new("1000"), vec![NicSpec::default()]);
    resolver
        .finish(Op::CreateInstance, rapi.create_instance(&spec, DryRun::enabled()))
        .await;

    // A small instance, removed right away.
    let spec = creation(&t, DiskSpec::new(800), vec![NicSpec::default()]);
    resolver
        .finish(Op::CreateInstance, rapi.create_instance(&spec, DryRun::disabled()))
        .await;
    resolver
        .finish(Op::DeleteInstance, rapi.delete_instance(name, DryRun::disabled()))
        .await;

    // The instance used by everything below.
    let spec = creation(&t, DiskSpec::new(1200), vec![NicSpec::default()]);
    resolver
        .finish(Op::CreateInstance, rapi.create_instance(&spec, DryRun::disabled()))
        .await;
    info!("instance created");

    rapi.get_instance(name).await;
    resolver
        .finish(Op::GetInstanceInfo, rapi.get_instance_info(name, false))
        .await;
    resolver
        .finish(Op::GetInstanceInfo, rapi.get_instance_info(name, true))
        .await;

    run_tags(resolver, TagScope::Instance(name)).await;

    let grow = GrowDiskSpec {
        disk: 0,
        amount: 100,
        wait_for_sync: true,
    };
    resolver
        .finish(Op::GrowInstanceDisk, rapi.grow_instance_disk(name, &grow))
        .await;

    let reboot = RebootOptions {
        kind: RebootKind::Soft,
        ignore_secondaries: true,
        dry_run: DryRun::enabled(),
        reason: Some("Hulk smash gently!".to_string()),
    };
    resolver
        .finish(Op::RebootInstance, rapi.reboot_instance(name, &reboot))
        .await;
    let shutdown = PowerOptions::default()
        .dry_run(DryRun::enabled())
        .reason("Hulk smash hard!");
    resolver
        .finish(Op::ShutdownInstance, rapi.shutdown_instance(name, &shutdown))
        .await;
    let startup = PowerOptions::default()
        .dry_run(DryRun::enabled())
        .reason("Not hard enough!");
    resolver
        .finish(Op::StartupInstance, rapi.startup_instance(name, &startup))
        .await;

    let reboot = RebootOptions {
        kind: RebootKind::Soft,
        ignore_secondaries: true,
        ..Default::default()
    };
    resolver
        .finish(Op::RebootInstance, rapi.reboot_instance(name, &reboot))
        .await;
    resolver
        .finish(
            Op::ShutdownInstance,
            rapi.shutdown_instance(name, &PowerOptions::default()),
        )
        .await;

    let to_drbd = ModifyInstanceSpec::convert_to(DiskTemplate::Drbd, Some(t.node_two.to_string()));
    resolver
        .finish(Op::ModifyInstance, rapi.modify_instance(name, &to_drbd))
        .await;
    let to_plain = ModifyInstanceSpec::convert_to(DiskTemplate::Plain, None);
    resolver
        .finish(Op::ModifyInstance, rapi.modify_instance(name, &to_plain))
        .await;

    resolver
        .finish(
            Op::RenameInstance,
            rapi.rename_instance(name, t.alternate, RenameOptions::checked()),
        )
        .await;
    resolver
        .finish(
            Op::RenameInstance,
            rapi.rename_instance(t.alternate, name, RenameOptions::default()),
        )
        .await;

    resolver
        .finish(
            Op::DeactivateInstanceDisks,
            rapi.deactivate_instance_disks(name),
        )
        .await;
    resolver
        .finish(Op::ActivateInstanceDisks, rapi.activate_instance_disks(name))
        .await;

    let recreate = RecreateDisksSpec {
        disks: vec![0],
        nodes: vec![t.node_one.to_string()],
    };
    resolver
        .finish(
            Op::RecreateInstanceDisks,
            rapi.recreate_instance_disks(name, &recreate),
        )
        .await;

    resolver
        .finish(
            Op::StartupInstance,
            rapi.startup_instance(name, &PowerOptions::default()),
        )
        .await;
    rapi.get_instance_console(name).await;

    let reinstall = ReinstallSpec {
        os: None,
        no_startup: false,
        osparams: Some(Map::new()),
    };
    resolver
        .finish(Op::ReinstallInstance, rapi.reinstall_instance(name, &reinstall))
        .await;

    resolver
        .finish(Op::DeleteInstance, rapi.delete_instance(name, DryRun::enabled()))
        .await;
    resolver
        .finish(Op::DeleteInstance, rapi.delete_instance(name, DryRun::disabled()))
        .await;
    info!("instance removed");
}
