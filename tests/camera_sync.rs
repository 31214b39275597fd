//! Camera synchronization across several viewports sharing one group.

use std::cell::Cell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use scatterview::camera::{
    CameraPose, CameraSyncController, OrbitCamera, SyncGroup, SyncState,
    ViewportId,
};
use scatterview::input::CameraCommand;
use scatterview::options::{CameraOptions, SyncOptions};
use web_time::{Duration, Instant};

fn linked(count: u32, sync: &SyncOptions) -> (SyncGroup, Vec<CameraSyncController>) {
    let group = SyncGroup::new(sync);
    let controllers = (0..count)
        .map(|i| {
            let mut ctl = CameraSyncController::new(
                ViewportId(i),
                OrbitCamera::new(&CameraOptions::default()),
            );
            ctl.attach(&group);
            ctl
        })
        .collect();
    (group, controllers)
}

fn counter(ctl: &mut CameraSyncController) -> Rc<Cell<u32>> {
    let hits = Rc::new(Cell::new(0));
    let slot = Rc::clone(&hits);
    let _ = ctl.on_pose_changed(move |_| slot.set(slot.get() + 1));
    hits
}

#[test]
fn broadcast_updates_every_peer_but_not_the_sender() {
    let (group, mut ctls) = linked(3, &SyncOptions::default());
    assert_eq!(group.len(), 3);
    let hits: Vec<_> = ctls.iter_mut().map(counter).collect();

    let pose = CameraPose::new(Vec3::new(4.0, -6.0, 8.0), Vec3::new(1.0, 0.0, 0.0));
    ctls[0].set_pose(pose);

    assert_eq!(ctls[0].pose(), pose);
    assert_eq!(ctls[1].pose(), pose);
    assert_eq!(ctls[2].pose(), pose);
    // Each member heard about the change exactly once; nothing bounced
    // back to the sender.
    assert!(hits.iter().all(|h| h.get() == 1));
    assert!(ctls.iter().all(|c| c.state() == SyncState::Listening));
}

#[test]
fn throttle_window_drops_second_broadcast() {
    let sync = SyncOptions {
        throttle_ms: 30,
        ..SyncOptions::default()
    };
    let (_group, mut ctls) = linked(2, &sync);
    let peer_hits = counter(&mut ctls[1]);

    let t0 = Instant::now();
    let first = CameraPose::new(Vec3::new(10.0, 0.0, 5.0), Vec3::ZERO);
    let second = CameraPose::new(Vec3::new(0.0, 10.0, 5.0), Vec3::ZERO);
    ctls[0].set_pose_at(first, t0);
    ctls[0].set_pose_at(second, t0 + Duration::from_millis(10));

    assert_eq!(peer_hits.get(), 1);
    assert_eq!(ctls[1].pose(), first);
    // The sender keeps its own latest pose.
    assert_eq!(ctls[0].pose(), second);

    let third = CameraPose::new(Vec3::new(-10.0, 0.0, 5.0), Vec3::ZERO);
    ctls[0].set_pose_at(third, t0 + Duration::from_millis(45));
    assert_eq!(peer_hits.get(), 2);
    assert_eq!(ctls[1].pose(), third);
}

#[test]
fn damped_orbit_converges_on_every_member() {
    let sync = SyncOptions {
        throttle_ms: 0,
        ..SyncOptions::default()
    };
    let (_group, mut ctls) = linked(3, &sync);
    let start = ctls[0].pose();

    let t0 = Instant::now();
    ctls[0].rotate(Vec2::new(40.0, 0.0));
    let mut now = t0;
    for _ in 0..200 {
        now += Duration::from_millis(16);
        if !ctls[0].tick(now) {
            break;
        }
    }

    let settled = ctls[0].pose();
    assert_ne!(settled, start);
    assert!((settled.distance() - start.distance()).abs() < 1e-3);
    assert_eq!(ctls[1].pose(), settled);
    assert_eq!(ctls[2].pose(), settled);
}

#[test]
fn throttled_damping_still_ends_on_the_same_pose() {
    // 16 ms frames against the default 30 ms window: every other frame
    // is held back, including possibly the last moving one.
    let (_group, mut ctls) = linked(2, &SyncOptions::default());
    let t0 = Instant::now();
    ctls[0].apply_command_at(CameraCommand::Zoom { delta: 3.0 }, t0);
    let mut now = t0;
    let mut frames_moved = 0;
    for _ in 0..240 {
        now += Duration::from_millis(16);
        if ctls[0].tick(now) {
            frames_moved += 1;
        }
    }

    assert!(frames_moved > 2);
    assert_eq!(ctls[1].pose(), ctls[0].pose());
}

#[test]
fn disabling_sync_keeps_cameras_independent() {
    let (group, mut ctls) = linked(2, &SyncOptions::default());
    let before = ctls[1].pose();
    group.set_enabled(false);
    ctls[0].set_pose(CameraPose::new(Vec3::new(3.0, 3.0, 3.0), Vec3::ZERO));
    assert_eq!(ctls[1].pose(), before);

    group.set_enabled(true);
    let pose = CameraPose::new(Vec3::new(6.0, 0.0, 2.0), Vec3::ZERO);
    ctls[0].set_pose(pose);
    assert_eq!(ctls[1].pose(), pose);
}

#[test]
fn dropped_member_leaves_the_group() {
    let (group, mut ctls) = linked(3, &SyncOptions::default());
    let gone = ctls.pop();
    drop(gone);
    assert_eq!(group.len(), 2);
    assert!(!group.contains(ViewportId(2)));

    ctls[1].detach();
    ctls[1].detach();
    assert_eq!(ctls[1].state(), SyncState::Detached);
    assert_eq!(group.len(), 1);

    let pose = CameraPose::new(Vec3::new(1.0, 8.0, 1.0), Vec3::ZERO);
    let detached_before = ctls[1].pose();
    ctls[0].set_pose(pose);
    assert_eq!(ctls[1].pose(), detached_before);
}
