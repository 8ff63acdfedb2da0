use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use rand::Rng;
use tokio::sync::Mutex;
use ulid::Ulid;

use shamba_core::{Device, DeviceId, DeviceState, Percentage, Sample, Zone, ZoneId};

use crate::{
    AuthBackend, AuthError, CommandError, DeviceBackend, FetchError, LoginOutcome, ProfileOutcome,
    ProfileUpdate, ZoneBackend,
};

/// A configured operator account in the mock world.
#[derive(Debug, Clone)]
pub struct MockUser {
    pub username: Box<str>,
    pub password: Box<str>,
    /// Raw role string, deliberately allowed to be messy; the console
    /// is the one responsible for normalization.
    pub role: Box<str>,
    pub full_name: Box<str>,
    pub email: Box<str>,
}

/// In-memory stand-in for the remote API, used by tests and the demo
/// binary. Implements all three backend contracts over one shared
/// world so a single instance can be handed out as each trait object.
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<Mutex<World>>,
}

struct World {
    users: Vec<MockUser>,
    /// Issued bearer tokens, mapped back to the username they belong to.
    sessions: HashMap<Box<str>, Box<str>>,
    devices: Vec<Device>,
    /// Telemetry per device, newest first, the order the real API
    /// contract delivers.
    histories: HashMap<DeviceId, Vec<Sample>>,
    zones: Vec<Zone>,
    commands: Vec<(DeviceId, Box<str>)>,
}

impl MockBackend {
    /// An empty world; populate it with the `add_*` methods.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(World {
                users: Vec::new(),
                sessions: HashMap::new(),
                devices: Vec::new(),
                histories: HashMap::new(),
                zones: Vec::new(),
                commands: Vec::new(),
            })),
        }
    }

    /// A populated demo world: two zones, `device_count` devices with
    /// `history_len` samples each, and one account per role. The tech
    /// account carries the legacy `"Technology"` role string on purpose
    /// so the whole normalization path gets exercised.
    pub fn demo_world(device_count: usize, history_len: usize) -> Self {
        let mut world = World {
            users: Vec::new(),
            sessions: HashMap::new(),
            devices: Vec::new(),
            histories: HashMap::new(),
            zones: Vec::new(),
            commands: Vec::new(),
        };

        world.users = vec![
            MockUser {
                username: "admin".into(),
                password: "admin".into(),
                role: "ADMIN".into(),
                full_name: "Abeba Kebede".into(),
                email: "admin@shamba.dev".into(),
            },
            MockUser {
                username: "tech".into(),
                password: "tech".into(),
                role: "Technology".into(),
                full_name: "Dawit Alemu".into(),
                email: "tech@shamba.dev".into(),
            },
            MockUser {
                username: "farmer".into(),
                password: "farmer".into(),
                role: "farmer".into(),
                full_name: "Sara Tesfaye".into(),
                email: "farmer@shamba.dev".into(),
            },
        ];

        let north = ZoneId::new(Ulid::new().to_string());
        let south = ZoneId::new(Ulid::new().to_string());
        world.zones = vec![
            Zone {
                id: north.clone(),
                name: "North field".into(),
            },
            Zone {
                id: south.clone(),
                name: "South field".into(),
            },
        ];

        let mut rng = rand::rng();
        for index in 0..device_count {
            let id = DeviceId::new(Ulid::new().to_string());
            let online = rng.random_ratio(4, 5);
            let device = Device {
                id: id.clone(),
                name: format!("Sensor pod {}", index + 1).into(),
                state: if online {
                    DeviceState::Online
                } else {
                    DeviceState::Offline
                },
                last_seen_at: Some(
                    Timestamp::now() - SignedDuration::from_secs(rng.random_range(30..3600)),
                ),
                battery_level: Some(Percentage(rng.random_range(20..100))),
                zone_id: Some(if index % 2 == 0 {
                    north.clone()
                } else {
                    south.clone()
                }),
            };
            let history = generate_history(&mut rng, history_len);
            world.devices.push(device);
            world.histories.insert(id, history);
        }

        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    pub async fn add_user(&self, user: MockUser) {
        self.inner.lock().await.users.push(user);
    }

    /// Register a device together with its newest-first history.
    pub async fn add_device(&self, device: Device, history: Vec<Sample>) {
        let mut world = self.inner.lock().await;
        world.histories.insert(device.id.clone(), history);
        world.devices.push(device);
    }

    pub async fn add_zone(&self, zone: Zone) {
        self.inner.lock().await.zones.push(zone);
    }

    pub async fn set_device_state(&self, device: &DeviceId, state: DeviceState) {
        let mut world = self.inner.lock().await;
        if let Some(entry) = world.devices.iter_mut().find(|d| &d.id == device) {
            entry.state = state;
        }
    }

    /// Total number of commands the mock has accepted.
    pub async fn command_count(&self) -> usize {
        self.inner.lock().await.commands.len()
    }

    /// Command tags accepted for one device, in dispatch order.
    pub async fn commands_for(&self, device: &DeviceId) -> Vec<Box<str>> {
        self.inner
            .lock()
            .await
            .commands
            .iter()
            .filter(|(id, _)| id == device)
            .map(|(_, tag)| tag.clone())
            .collect()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate `len` samples, newest first, ten minutes apart.
fn generate_history(rng: &mut impl Rng, len: usize) -> Vec<Sample> {
    let now = Timestamp::now();
    (0..len)
        .map(|age| Sample {
            timestamp: now - SignedDuration::from_secs(600 * age as i64),
            temp: Some(rng.random_range(15.0..35.0)),
            humidity_air: Some(rng.random_range(30.0..90.0)),
            humidity_soil: Some(rng.random_range(20.0..80.0)),
            light: Some(rng.random_range(0.0..100.0)),
        })
        .collect()
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let mut world = self.inner.lock().await;

        let user = world
            .users
            .iter()
            .find(|u| &*u.username == username && &*u.password == password)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        let token: Box<str> = format!("mock-{}", Ulid::new()).into();
        world
            .sessions
            .insert(token.clone(), user.username.clone());

        Ok(LoginOutcome {
            access_token: token,
            role: user.role,
            username: user.username,
        })
    }

    async fn update_profile(
        &self,
        token: &str,
        update: ProfileUpdate,
    ) -> Result<ProfileOutcome, AuthError> {
        let mut world = self.inner.lock().await;

        let username = world
            .sessions
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("unknown session".into()))?;

        let user = world
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| AuthError::Rejected("unknown session".into()))?;

        user.full_name = update.full_name.clone();
        user.email = update.email.clone();

        Ok(ProfileOutcome {
            full_name: update.full_name,
            email: update.email,
        })
    }
}

#[async_trait]
impl DeviceBackend for MockBackend {
    async fn list_all(&self, token: &str) -> Result<Vec<Device>, FetchError> {
        if token.is_empty() {
            return Err(FetchError::Rejected("missing bearer token".into()));
        }
        Ok(self.inner.lock().await.devices.clone())
    }

    async fn history(
        &self,
        token: &str,
        device: &DeviceId,
        limit: usize,
    ) -> Result<Vec<Sample>, FetchError> {
        if token.is_empty() {
            return Err(FetchError::Rejected("missing bearer token".into()));
        }
        let world = self.inner.lock().await;
        let history = world
            .histories
            .get(device)
            .ok_or_else(|| FetchError::Rejected(format!("unknown device {device}").into()))?;
        Ok(history.iter().take(limit).cloned().collect())
    }

    async fn send_command(
        &self,
        token: &str,
        device: &DeviceId,
        tag: &str,
    ) -> Result<(), CommandError> {
        if token.is_empty() {
            return Err(CommandError::Rejected("missing bearer token".into()));
        }
        let mut world = self.inner.lock().await;

        let entry = world
            .devices
            .iter()
            .find(|d| &d.id == device)
            .ok_or_else(|| CommandError::Rejected(format!("unknown device {device}").into()))?;

        if entry.state == DeviceState::Offline {
            return Err(CommandError::Rejected(
                format!("device {} is offline", entry.name).into(),
            ));
        }

        world.commands.push((device.clone(), tag.into()));
        Ok(())
    }
}

#[async_trait]
impl ZoneBackend for MockBackend {
    async fn list_all(&self, token: &str) -> Result<Vec<Zone>, FetchError> {
        if token.is_empty() {
            return Err(FetchError::Rejected("missing bearer token".into()));
        }
        Ok(self.inner.lock().await.zones.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online_device(name: &str) -> Device {
        Device {
            id: DeviceId::new(Ulid::new().to_string()),
            name: name.into(),
            state: DeviceState::Online,
            last_seen_at: Some(Timestamp::now()),
            battery_level: Some(Percentage(80)),
            zone_id: None,
        }
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let backend = MockBackend::new();
        backend
            .add_user(MockUser {
                username: "farmer".into(),
                password: "secret".into(),
                role: "FARMER".into(),
                full_name: "Sara".into(),
                email: "sara@shamba.dev".into(),
            })
            .await;

        let err = backend.login("farmer", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let outcome = backend.login("farmer", "secret").await.unwrap();
        assert_eq!(&*outcome.role, "FARMER");
        assert!(!outcome.access_token.is_empty());
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let backend = MockBackend::new();
        let device = online_device("pod");
        let id = device.id.clone();

        let now = Timestamp::now();
        let history: Vec<Sample> = (0..5)
            .map(|age| Sample {
                timestamp: now - SignedDuration::from_secs(600 * age),
                temp: Some(20.0 + age as f64),
                humidity_air: None,
                humidity_soil: None,
                light: None,
            })
            .collect();
        backend.add_device(device, history).await;

        let samples = backend.history("token", &id, 3).await.unwrap();
        assert_eq!(samples.len(), 3);
        assert!(samples[0].timestamp > samples[1].timestamp);
        assert!(samples[1].timestamp > samples[2].timestamp);
    }

    #[tokio::test]
    async fn commands_to_offline_devices_are_refused() {
        let backend = MockBackend::new();
        let device = online_device("pump house");
        let id = device.id.clone();
        backend.add_device(device, Vec::new()).await;
        backend.set_device_state(&id, DeviceState::Offline).await;

        let err = backend
            .send_command("token", &id, "PUMP_ON")
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Rejected(_)));
        assert_eq!(backend.command_count().await, 0);
    }

    #[tokio::test]
    async fn accepted_commands_are_recorded_in_order() {
        let backend = MockBackend::new();
        let device = online_device("mister");
        let id = device.id.clone();
        backend.add_device(device, Vec::new()).await;

        backend.send_command("token", &id, "MIST_ON").await.unwrap();
        backend
            .send_command("token", &id, "MIST_OFF")
            .await
            .unwrap();

        let tags = backend.commands_for(&id).await;
        assert_eq!(tags, vec!["MIST_ON".into(), "MIST_OFF".into()]);
    }
}
