//! Test utilities: scripted transports and synthetic session payloads
//!
//! Shared by unit tests and benchmarks so that neither needs network access.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::client::{GraphQlRequest, GraphQlResponse, Transport};
use crate::schema::Session;
use crate::{Result, TimingError};

/// [`Transport`] that answers from a fixed script and records every request.
///
/// Once the script is exhausted every further request fails with a transport
/// error.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<GraphQlResponse<Value>>>>,
    requests: Arc<Mutex<Vec<GraphQlRequest>>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<GraphQlResponse<Value>>>) -> Self {
        Self { script: Mutex::new(script.into()), requests: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Handle to the requests seen so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<GraphQlRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse<Value>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.script
            .lock()
            .map_err(|_| TimingError::transport("script lock poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(TimingError::transport("script exhausted")))
    }
}

/// JSON for a running session with `participants` cars.
///
/// Car `n` (1-based) is in position `n`, has best lap `90_000 + 250 * (n - 1)`
/// ms and trails the car ahead by 250 ms. Rows are emitted in reverse
/// position order so ordering logic is exercised.
pub fn session_json(session_id: &str, participants: usize) -> Value {
    let rows: Vec<Value> = (1..=participants)
        .rev()
        .map(|n| {
            let best = 90_000 + 250 * (n as i64 - 1);
            json!({
                "id": format!("p{}", n),
                "number": format!("{}", n * 3),
                "position": n,
                "isOut": false,
                "hasSeenCheckeredFlag": false,
                "completeLapsCount": 20,
                "pitStopCount": 1,
                "bestTopSpeedKMH": 280.0,
                "lastLap": { "timeMilliseconds": best + 500, "state": "NORMAL" },
                "bestLap": { "timeMilliseconds": best, "state": "PERSONAL_BEST" },
                "previousParticipantGap": if n == 1 {
                    Value::Null
                } else {
                    json!({ "type": "TIME", "lapDifference": 0, "timeMilliseconds": 250 })
                },
                "driver": {
                    "firstName": format!("Driver{}", n),
                    "lastName": "Test",
                    "country": { "isoCode2": "FR" }
                },
                "team": { "name": format!("Team {}", n) },
                "category": { "id": "c1", "color": "#00ff00" }
            })
        })
        .collect();

    json!({
        "id": session_id,
        "name": "Race",
        "race": { "name": "Test Event" },
        "startsAt": "2025-05-10T12:00:00Z",
        "liveStatus": {
            "isClosed": false,
            "isSessionRunning": true,
            "sessionStartTime": "2025-05-10T12:00:00Z",
            "hasChequeredFlag": false,
            "currentFlag": { "type": "GREEN" }
        },
        "weather": {
            "ambientTemperatureEx": { "celsiusDegrees": 22.0 },
            "trackTemperatureEx": { "celsiusDegrees": 35.0 },
            "humidityPercent": 45.0
        },
        "participants": rows
    })
}

/// A running session with `participants` cars, see [`session_json`].
pub fn sample_session(participants: usize) -> Session {
    serde_json::from_value(session_json("7622", participants))
        .unwrap_or_else(|e| panic!("synthetic session must decode: {e}"))
}

/// `{data: {session}}` envelope for [`session_json`].
pub fn session_envelope(session_id: &str, participants: usize) -> GraphQlResponse<Value> {
    GraphQlResponse { data: Some(json!({ "session": session_json(session_id, participants) })), errors: None }
}

/// `{data: {races}}` envelope.
pub fn schedule_envelope(races: Value) -> GraphQlResponse<Value> {
    GraphQlResponse { data: Some(json!({ "races": races })), errors: None }
}
