//! Multi-viewport camera synchronization.
//!
//! Every viewport owns one [`CameraSyncController`] wrapping its
//! [`OrbitCamera`]. Controllers that should move together join a shared
//! [`SyncGroup`]. A local pose change is pushed to every *other* member of
//! the group, subject to three rules:
//!
//! - **Self-exclusion**: the originating controller never receives its own
//!   broadcast.
//! - **Re-entrancy guard**: while a controller applies a pose received from
//!   a peer, any local change it raises (for example an observer that feeds
//!   the pose back into the controller) is not broadcast again.
//! - **Throttle**: the group admits at most one broadcast per interval.
//!   Broadcasts inside the window are dropped, not queued. Only the latest
//!   dropped pose is remembered, and [`CameraSyncController::tick`] sends it
//!   once the camera is at rest and the window has passed.
//!
//! Everything is single-threaded. Group state lives behind
//! `Rc<RefCell<_>>` and no borrow is held while observers run, so an
//! observer may call back into any controller.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::{Mat4, Vec2, Vec3};
use rustc_hash::FxHashMap;
use web_time::Instant;

use super::orbit::OrbitCamera;
use super::pose::CameraPose;
use super::throttle::Throttle;
use crate::error::ScatterError;
use crate::input::CameraCommand;
use crate::options::SyncOptions;

/// Identifies one viewport inside a sync group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u32);

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewport {}", self.0)
    }
}

/// Handle returned by [`CameraSyncController::on_pose_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Created, not yet in a group.
    Idle,
    /// In a group, waiting for local or remote changes.
    Listening,
    /// Pushing a local pose to the other members.
    Broadcasting,
    /// Left its group and released its observers.
    Detached,
}

type PoseObserver = Box<dyn FnMut(&CameraPose)>;

/// Per-viewport state reachable from the group.
struct Member {
    camera: OrbitCamera,
    state: SyncState,
    /// Nesting depth of poses received from peers being applied.
    applying: u32,
    observers: Vec<(ListenerId, PoseObserver)>,
    next_listener: u64,
    /// Observers are taken out of the member while they run.
    notifying: bool,
    /// Ids of the observers currently taken out.
    in_flight: Vec<ListenerId>,
    removed_while_notifying: Vec<ListenerId>,
    /// Latest local pose the throttle kept from the peers.
    unsent: Option<CameraPose>,
}

impl Member {
    fn new(camera: OrbitCamera) -> Self {
        Self {
            camera,
            state: SyncState::Idle,
            applying: 0,
            observers: Vec::new(),
            next_listener: 0,
            notifying: false,
            in_flight: Vec::new(),
            removed_while_notifying: Vec::new(),
            unsent: None,
        }
    }
}

/// Outcome of asking the group to broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Allowed,
    Throttled,
    Disabled,
}

struct GroupState {
    members: FxHashMap<ViewportId, Weak<RefCell<Member>>>,
    enabled: bool,
    throttle: Throttle,
}

/// A set of linked viewports.
///
/// The owner (normally a comparison view) holds the group; controllers
/// hold only a weak reference, so dropping the group unlinks everyone.
/// Cloning yields another handle to the same group.
#[derive(Clone)]
pub struct SyncGroup {
    inner: Rc<RefCell<GroupState>>,
}

impl SyncGroup {
    /// Empty group configured from `options`.
    #[must_use]
    pub fn new(options: &SyncOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GroupState {
                members: FxHashMap::default(),
                enabled: options.enabled,
                throttle: Throttle::from_millis(options.throttle_ms),
            })),
        }
    }

    /// Number of live members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .borrow()
            .members
            .values()
            .filter(|m| m.strong_count() > 0)
            .count()
    }

    /// Whether the group has no live members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is a live member.
    #[must_use]
    pub fn contains(&self, id: ViewportId) -> bool {
        self.inner
            .borrow()
            .members
            .get(&id)
            .is_some_and(|m| m.strong_count() > 0)
    }

    /// Whether local changes are pushed to peers.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.borrow().enabled
    }

    /// Turn synchronization on or off for every member. Poses that diverged
    /// while disabled are not reconciled.
    pub fn set_enabled(&self, enabled: bool) {
        let mut inner = self.inner.borrow_mut();
        if inner.enabled != enabled {
            log::debug!(
                "camera sync {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        inner.enabled = enabled;
        inner.throttle.reset();
        // Poses held back before the toggle are not reconciled.
        for member in inner.members.values().filter_map(Weak::upgrade) {
            if let Ok(mut m) = member.try_borrow_mut() {
                m.unsent = None;
            }
        }
    }

    /// Lifecycle state of member `id`.
    #[must_use]
    pub fn member_state(&self, id: ViewportId) -> Option<SyncState> {
        let member = self.inner.borrow().members.get(&id)?.upgrade()?;
        let state = member.try_borrow().ok()?.state;
        Some(state)
    }

    fn downgrade(&self) -> Weak<RefCell<GroupState>> {
        Rc::downgrade(&self.inner)
    }

    fn join(&self, id: ViewportId, member: Weak<RefCell<Member>>) {
        if let Some(previous) = self.inner.borrow_mut().members.insert(id, member)
        {
            if previous.strong_count() > 0 {
                log::warn!("{id} joined the sync group twice, replacing");
            }
        }
    }

    fn leave(&self, id: ViewportId) -> Result<(), ScatterError> {
        self.inner
            .borrow_mut()
            .members
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| {
                ScatterError::ResourceDisposal(format!(
                    "{id} is not a member of the sync group"
                ))
            })
    }

    /// Whether a broadcast at `now` is allowed.
    fn admit(&self, now: Instant) -> Admission {
        let mut inner = self.inner.borrow_mut();
        if !inner.enabled {
            Admission::Disabled
        } else if inner.throttle.try_acquire(now) {
            Admission::Allowed
        } else {
            Admission::Throttled
        }
    }

    /// Live members other than `except`, pruning dropped ones.
    fn peers(&self, except: ViewportId) -> Vec<Rc<RefCell<Member>>> {
        let mut inner = self.inner.borrow_mut();
        inner.members.retain(|_, m| m.strong_count() > 0);
        let mut peers: Vec<_> = inner
            .members
            .iter()
            .filter(|(id, _)| **id != except)
            .filter_map(|(id, m)| Some((*id, m.upgrade()?)))
            .collect();
        peers.sort_by_key(|(id, _)| *id);
        peers.into_iter().map(|(_, m)| m).collect()
    }
}

impl fmt::Debug for SyncGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SyncGroup")
            .field("members", &inner.members.len())
            .field("enabled", &inner.enabled)
            .field("throttle", &inner.throttle.interval())
            .finish()
    }
}

/// Run every observer of `member` with `pose`, with no borrow held.
fn notify(member: &Rc<RefCell<Member>>, pose: &CameraPose) {
    let (mut observers, outermost) = {
        let mut m = member.borrow_mut();
        let outermost = !std::mem::replace(&mut m.notifying, true);
        let observers = std::mem::take(&mut m.observers);
        m.in_flight.extend(observers.iter().map(|(id, _)| *id));
        (observers, outermost)
    };
    for (_, observer) in &mut observers {
        observer(pose);
    }
    let mut m = member.borrow_mut();
    // Keep listeners registered by the observers themselves.
    observers.append(&mut m.observers);
    if outermost {
        let removed = std::mem::take(&mut m.removed_while_notifying);
        observers.retain(|(id, _)| !removed.contains(id));
        m.in_flight.clear();
        m.notifying = false;
    }
    m.observers = observers;
}

/// Apply a pose received from a peer.
///
/// A member that is itself mid-broadcast keeps its own pose: a peer's
/// observer reacting to that broadcast must not write back into it.
fn apply_remote(member: &Rc<RefCell<Member>>, pose: CameraPose) {
    {
        let mut m = member.borrow_mut();
        if matches!(m.state, SyncState::Detached | SyncState::Broadcasting) {
            return;
        }
        m.applying += 1;
        m.unsent = None;
        m.camera.set_pose(pose);
    }
    notify(member, &pose);
    member.borrow_mut().applying -= 1;
}

/// Owns one viewport's camera and links it to a [`SyncGroup`].
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use scatterview::camera::{
///     CameraPose, CameraSyncController, OrbitCamera, SyncGroup, ViewportId,
/// };
/// use scatterview::options::SyncOptions;
///
/// let group = SyncGroup::new(&SyncOptions::default());
/// let mut a = CameraSyncController::new(ViewportId(0), OrbitCamera::default());
/// let mut b = CameraSyncController::new(ViewportId(1), OrbitCamera::default());
/// a.attach(&group);
/// b.attach(&group);
///
/// let pose = CameraPose::new(Vec3::new(0.0, -12.0, 4.0), Vec3::ZERO);
/// a.set_pose(pose);
/// assert_eq!(b.pose(), pose);
/// ```
pub struct CameraSyncController {
    id: ViewportId,
    member: Rc<RefCell<Member>>,
    group: Option<Weak<RefCell<GroupState>>>,
}

impl CameraSyncController {
    /// Controller for viewport `id` driving `camera`. Starts [`SyncState::Idle`].
    #[must_use]
    pub fn new(id: ViewportId, camera: OrbitCamera) -> Self {
        Self {
            id,
            member: Rc::new(RefCell::new(Member::new(camera))),
            group: None,
        }
    }

    /// Viewport this controller belongs to.
    #[must_use]
    pub fn id(&self) -> ViewportId {
        self.id
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.member.borrow().state
    }

    /// Current camera pose.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        self.member.borrow().camera.pose()
    }

    /// View-projection matrix of the owned camera.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.member.borrow().camera.view_projection()
    }

    /// Forward a viewport resize to the camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.member.borrow_mut().camera.resize(width, height);
    }

    /// Whether the controller is linked to a live group.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.group().is_some()
    }

    /// Whether the group currently propagates changes.
    #[must_use]
    pub fn sync_enabled(&self) -> bool {
        self.group().is_some_and(|g| g.is_enabled())
    }

    /// Join `group` and start listening. Leaves any previous group first.
    pub fn attach(&mut self, group: &SyncGroup) {
        if self.group.is_some() {
            self.leave_group();
        }
        group.join(self.id, Rc::downgrade(&self.member));
        self.group = Some(group.downgrade());
        self.member.borrow_mut().state = SyncState::Listening;
        log::debug!("{} attached to camera sync group", self.id);
    }

    /// Set the pose as a local interaction.
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.set_pose_at(pose, Instant::now());
    }

    /// [`set_pose`](Self::set_pose) with an explicit timestamp for the
    /// throttle.
    pub fn set_pose_at(&mut self, pose: CameraPose, now: Instant) {
        self.member.borrow_mut().camera.set_pose(pose);
        self.commit_local(pose, now);
    }

    /// Orbit by a pixel drag delta.
    pub fn rotate(&mut self, delta: Vec2) {
        self.apply_command_at(CameraCommand::Rotate { delta }, Instant::now());
    }

    /// Pan by a pixel drag delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.apply_command_at(CameraCommand::Pan { delta }, Instant::now());
    }

    /// Zoom by a scroll delta.
    pub fn zoom(&mut self, delta: f32) {
        self.apply_command_at(CameraCommand::Zoom { delta }, Instant::now());
    }

    /// Execute a camera gesture as a local interaction. With damping the
    /// pose moves on later [`tick`](Self::tick)s instead.
    pub fn apply_command_at(&mut self, command: CameraCommand, now: Instant) {
        let (before, after) = {
            let mut m = self.member.borrow_mut();
            let before = m.camera.pose();
            match command {
                CameraCommand::Rotate { delta } => m.camera.rotate(delta),
                CameraCommand::Pan { delta } => m.camera.pan(delta),
                CameraCommand::Zoom { delta } => m.camera.zoom(delta),
            }
            (before, m.camera.pose())
        };
        if after != before {
            self.commit_local(after, now);
        }
    }

    /// Advance camera damping by one frame. Returns whether the pose moved.
    ///
    /// Once the camera is at rest, a final pose the throttle held back is
    /// pushed to the peers as soon as the window allows.
    pub fn tick(&mut self, now: Instant) -> bool {
        let (moved, unsent) = {
            let mut m = self.member.borrow_mut();
            let moved = m.camera.update().then(|| m.camera.pose());
            (moved, m.unsent)
        };
        match (moved, unsent) {
            (Some(pose), _) => {
                self.commit_local(pose, now);
                true
            }
            (None, Some(pose)) => {
                self.broadcast(pose, now);
                false
            }
            (None, None) => false,
        }
    }

    /// Frame a bounding sphere as a local interaction.
    pub fn fit_to_radius(&mut self, center: Vec3, radius: f32) {
        let pose = {
            let mut m = self.member.borrow_mut();
            m.camera.fit_to_radius(center, radius);
            m.camera.pose()
        };
        self.commit_local(pose, Instant::now());
    }

    /// Register an observer fired on every pose change, local or remote.
    pub fn on_pose_changed(
        &mut self,
        observer: impl FnMut(&CameraPose) + 'static,
    ) -> ListenerId {
        let mut m = self.member.borrow_mut();
        let id = ListenerId(m.next_listener);
        m.next_listener += 1;
        m.observers.push((id, Box::new(observer)));
        id
    }

    /// Deregister an observer. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let mut m = self.member.borrow_mut();
        let before = m.observers.len();
        m.observers.retain(|(lid, _)| *lid != id);
        if m.observers.len() != before {
            return true;
        }
        if m.in_flight.contains(&id) && !m.removed_while_notifying.contains(&id) {
            m.removed_while_notifying.push(id);
            return true;
        }
        false
    }

    /// Turn synchronization on or off for the whole group.
    pub fn set_sync_enabled(&mut self, enabled: bool) {
        match self.group() {
            Some(group) => group.set_enabled(enabled),
            None => log::debug!("{}: set_sync_enabled without a group", self.id),
        }
    }

    /// Leave the group, then release observers. Safe to call repeatedly.
    pub fn detach(&mut self) {
        if self.state() == SyncState::Detached {
            return;
        }
        self.leave_group();
        let mut m = self.member.borrow_mut();
        m.observers.clear();
        m.removed_while_notifying.clear();
        m.unsent = None;
        let pose = m.camera.pose();
        m.camera.set_pose(pose);
        m.state = SyncState::Detached;
        log::debug!("{} detached from camera sync", self.id);
    }

    fn group(&self) -> Option<SyncGroup> {
        self.group
            .as_ref()?
            .upgrade()
            .map(|inner| SyncGroup { inner })
    }

    fn leave_group(&mut self) {
        let Some(weak) = self.group.take() else {
            return;
        };
        let result = weak
            .upgrade()
            .ok_or_else(|| {
                ScatterError::ResourceDisposal(
                    "sync group already dropped".to_owned(),
                )
            })
            .and_then(|inner| SyncGroup { inner }.leave(self.id));
        if let Err(e) = result {
            log::warn!("{}: leaving camera sync failed: {e}", self.id);
        }
    }

    fn commit_local(&mut self, pose: CameraPose, now: Instant) {
        notify(&self.member, &pose);
        self.broadcast(pose, now);
    }

    fn broadcast(&self, pose: CameraPose, now: Instant) {
        {
            let m = self.member.borrow();
            if m.applying > 0 || m.state != SyncState::Listening {
                return;
            }
        }
        let Some(group) = self.group() else {
            return;
        };
        match group.admit(now) {
            Admission::Allowed => {}
            Admission::Throttled => {
                self.member.borrow_mut().unsent = Some(pose);
                return;
            }
            Admission::Disabled => return,
        }

        let peers = group.peers(self.id);
        {
            let mut m = self.member.borrow_mut();
            m.unsent = None;
            m.state = SyncState::Broadcasting;
        }
        for peer in &peers {
            apply_remote(peer, pose);
        }
        self.member.borrow_mut().state = SyncState::Listening;
        log::trace!("{} pushed pose to {} peers", self.id, peers.len());
    }
}

impl fmt::Debug for CameraSyncController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraSyncController")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Drop for CameraSyncController {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use web_time::Duration;

    use super::*;
    use crate::options::CameraOptions;

    fn controller(id: u32) -> CameraSyncController {
        CameraSyncController::new(ViewportId(id), OrbitCamera::default())
    }

    fn pose(x: f32) -> CameraPose {
        CameraPose::new(Vec3::new(x, 2.0, 3.0), Vec3::new(0.5, 0.0, 0.0))
    }

    #[test]
    fn lifecycle_states() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        assert_eq!(a.state(), SyncState::Idle);
        a.attach(&group);
        assert_eq!(a.state(), SyncState::Listening);
        assert!(group.contains(ViewportId(0)));
        a.detach();
        assert_eq!(a.state(), SyncState::Detached);
        assert!(group.is_empty());
    }

    #[test]
    fn broadcast_reaches_others_only() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        let mut b = controller(1);
        let mut c = controller(2);
        for ctl in [&mut a, &mut b, &mut c] {
            ctl.attach(&group);
        }
        let a_hits = Rc::new(Cell::new(0));
        let hits = Rc::clone(&a_hits);
        let _ = a.on_pose_changed(move |_| hits.set(hits.get() + 1));

        a.set_pose(pose(7.0));
        assert_eq!(b.pose(), pose(7.0));
        assert_eq!(c.pose(), pose(7.0));
        assert_eq!(a.pose(), pose(7.0));
        // Local notification only: no echo back to A.
        assert_eq!(a_hits.get(), 1);
    }

    #[test]
    fn peer_sees_broadcasting_state() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        let mut b = controller(1);
        a.attach(&group);
        b.attach(&group);
        let seen = Rc::new(Cell::new(None));
        let slot = Rc::clone(&seen);
        let handle = group.clone();
        let _ = b.on_pose_changed(move |_| {
            slot.set(handle.member_state(ViewportId(0)));
        });
        a.set_pose(pose(1.0));
        assert_eq!(seen.get(), Some(SyncState::Broadcasting));
        assert_eq!(a.state(), SyncState::Listening);
    }

    #[test]
    fn feedback_from_observer_does_not_rebroadcast() {
        let group = SyncGroup::new(&SyncOptions {
            throttle_ms: 0,
            ..SyncOptions::default()
        });
        let mut a = controller(0);
        let b = Rc::new(RefCell::new(controller(1)));
        a.attach(&group);
        b.borrow_mut().attach(&group);

        // B's observer writes a modified pose back into B.
        let b_handle = Rc::clone(&b);
        let _ = b.borrow_mut().on_pose_changed(move |p| {
            let echoed = p.translated(Vec3::X);
            if let Ok(mut ctl) = b_handle.try_borrow_mut() {
                ctl.set_pose(echoed);
            }
        });

        a.set_pose(pose(4.0));
        assert_eq!(a.pose(), pose(4.0));
        assert_eq!(b.borrow().pose(), pose(4.0).translated(Vec3::X));
    }

    #[test]
    fn nested_remote_apply_keeps_guard_and_sender_pose() {
        let group = SyncGroup::new(&SyncOptions {
            throttle_ms: 0,
            ..SyncOptions::default()
        });
        let mut a = controller(0);
        let b = Rc::new(RefCell::new(controller(1)));
        let c = Rc::new(RefCell::new(controller(2)));
        a.attach(&group);
        b.borrow_mut().attach(&group);
        c.borrow_mut().attach(&group);
        let a_hits = Rc::new(Cell::new(0));
        let hits = Rc::clone(&a_hits);
        let _ = a.on_pose_changed(move |_| hits.set(hits.get() + 1));

        // B moves C, whose broadcast lands back on B, then B feeds back.
        let (b_handle, c_handle) = (Rc::clone(&b), Rc::clone(&c));
        let _ = b.borrow_mut().on_pose_changed(move |p| {
            if let Ok(mut ctl) = c_handle.try_borrow_mut() {
                ctl.set_pose(*p);
            }
            if let Ok(mut ctl) = b_handle.try_borrow_mut() {
                ctl.set_pose(p.translated(Vec3::X));
            }
        });

        let sent = CameraPose::new(Vec3::new(4.0, 2.0, 3.0), Vec3::ZERO);
        a.set_pose(sent);
        assert_eq!(a.pose(), sent);
        assert_eq!(a_hits.get(), 1);
        assert_eq!(b.borrow().pose(), sent.translated(Vec3::X));
        assert_eq!(c.borrow().pose(), sent);
        assert_eq!(a.state(), SyncState::Listening);
    }

    #[test]
    fn throttled_final_pose_is_sent_once_at_rest() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        let mut b = controller(1);
        a.attach(&group);
        b.attach(&group);

        let t0 = Instant::now();
        a.set_pose_at(pose(1.0), t0);
        a.set_pose_at(pose(2.0), t0 + Duration::from_millis(10));
        assert_eq!(b.pose(), pose(1.0));

        // Still inside the window: held back.
        assert!(!a.tick(t0 + Duration::from_millis(20)));
        assert_eq!(b.pose(), pose(1.0));
        assert!(!a.tick(t0 + Duration::from_millis(36)));
        assert_eq!(b.pose(), pose(2.0));

        // Nothing left to send; a later remote pose is not overwritten.
        b.set_pose_at(pose(3.0), t0 + Duration::from_millis(80));
        assert!(!a.tick(t0 + Duration::from_millis(120)));
        assert_eq!(a.pose(), pose(3.0));
        assert_eq!(b.pose(), pose(3.0));
    }

    #[test]
    fn held_back_pose_is_dropped_when_sync_toggles() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        let mut b = controller(1);
        a.attach(&group);
        b.attach(&group);

        let t0 = Instant::now();
        a.set_pose_at(pose(1.0), t0);
        a.set_pose_at(pose(2.0), t0 + Duration::from_millis(10));
        group.set_enabled(false);
        group.set_enabled(true);
        assert!(!a.tick(t0 + Duration::from_millis(50)));
        assert_eq!(b.pose(), pose(1.0));
    }

    #[test]
    fn throttle_drops_second_broadcast() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        let mut b = controller(1);
        a.attach(&group);
        b.attach(&group);
        let applied = Rc::new(Cell::new(0));
        let count = Rc::clone(&applied);
        let _ = b.on_pose_changed(move |_| count.set(count.get() + 1));

        let t0 = Instant::now();
        a.set_pose_at(pose(1.0), t0);
        a.set_pose_at(pose(2.0), t0 + Duration::from_millis(10));
        assert_eq!(applied.get(), 1);
        assert_eq!(b.pose(), pose(1.0));
        assert_eq!(a.pose(), pose(2.0));

        a.set_pose_at(pose(3.0), t0 + Duration::from_millis(45));
        assert_eq!(applied.get(), 2);
        assert_eq!(b.pose(), pose(3.0));
    }

    #[test]
    fn disabled_group_keeps_poses_independent() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        let mut b = controller(1);
        a.attach(&group);
        b.attach(&group);
        a.set_sync_enabled(false);
        assert!(!b.sync_enabled());

        let t0 = Instant::now();
        a.set_pose_at(pose(5.0), t0);
        assert_eq!(b.pose(), OrbitCamera::default().pose());

        // Re-enabling does not reconcile; the next broadcast wins.
        b.set_sync_enabled(true);
        assert_ne!(a.pose(), b.pose());
        b.set_pose_at(pose(9.0), t0 + Duration::from_millis(1));
        assert_eq!(a.pose(), pose(9.0));
    }

    #[test]
    fn gestures_broadcast_immediately_without_damping() {
        let options = CameraOptions {
            damping_factor: 0.0,
            ..CameraOptions::default()
        };
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = CameraSyncController::new(ViewportId(0), OrbitCamera::new(&options));
        let mut b = controller(1);
        a.attach(&group);
        b.attach(&group);
        a.apply_command_at(CameraCommand::Zoom { delta: 2.0 }, Instant::now());
        assert_eq!(b.pose(), a.pose());
        assert!(a.pose().distance() < OrbitCamera::default().distance());
    }

    #[test]
    fn damped_gestures_broadcast_on_tick() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        let mut b = controller(1);
        a.attach(&group);
        b.attach(&group);
        let start = b.pose();

        let t0 = Instant::now();
        a.apply_command_at(
            CameraCommand::Rotate {
                delta: Vec2::new(40.0, 0.0),
            },
            t0,
        );
        assert_eq!(b.pose(), start);
        assert!(a.tick(t0 + Duration::from_millis(16)));
        assert_eq!(b.pose(), a.pose());
        assert_ne!(b.pose(), start);
    }

    #[test]
    fn listeners_can_be_removed() {
        let mut a = controller(0);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = a.on_pose_changed(move |_| h.set(h.get() + 1));
        a.set_pose(pose(1.0));
        assert!(a.remove_listener(id));
        assert!(!a.remove_listener(id));
        a.set_pose(pose(2.0));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn removal_during_notification_only_counts_live_listeners() {
        let group = SyncGroup::new(&SyncOptions {
            throttle_ms: 0,
            ..SyncOptions::default()
        });
        let mut a = controller(0);
        let b = Rc::new(RefCell::new(controller(1)));
        a.attach(&group);
        b.borrow_mut().attach(&group);

        let stale = b.borrow_mut().on_pose_changed(|_| {});
        assert!(b.borrow_mut().remove_listener(stale));

        let own_id = Rc::new(Cell::new(None));
        let results = Rc::new(Cell::new(None));
        let hits = Rc::new(Cell::new(0));
        let (handle, own, out, count) = (
            Rc::clone(&b),
            Rc::clone(&own_id),
            Rc::clone(&results),
            Rc::clone(&hits),
        );
        let id = b.borrow_mut().on_pose_changed(move |_| {
            count.set(count.get() + 1);
            let (Ok(mut ctl), Some(own)) = (handle.try_borrow_mut(), own.get())
            else {
                return;
            };
            out.set(Some((
                ctl.remove_listener(stale),
                ctl.remove_listener(own),
                ctl.remove_listener(own),
            )));
        });
        own_id.set(Some(id));

        a.set_pose(pose(1.0));
        assert_eq!(results.get(), Some((false, true, false)));
        a.set_pose(pose(2.0));
        assert_eq!(hits.get(), 1);
        assert!(!b.borrow_mut().remove_listener(id));
    }

    #[test]
    fn detach_is_idempotent_and_survives_dropped_group() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        a.attach(&group);
        drop(group);
        assert!(!a.is_attached());
        a.detach();
        a.detach();
        assert_eq!(a.state(), SyncState::Detached);
    }

    #[test]
    fn detached_member_ignores_broadcasts() {
        let group = SyncGroup::new(&SyncOptions::default());
        let mut a = controller(0);
        let mut b = controller(1);
        a.attach(&group);
        b.attach(&group);
        b.detach();
        a.set_pose(pose(6.0));
        assert_eq!(b.pose(), OrbitCamera::default().pose());
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn dropped_controller_leaves_group() {
        let group = SyncGroup::new(&SyncOptions::default());
        {
            let mut a = controller(0);
            a.attach(&group);
            assert_eq!(group.len(), 1);
        }
        assert!(group.is_empty());
    }
}
