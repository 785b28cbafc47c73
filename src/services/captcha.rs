//! Single-use arithmetic captcha for the login form.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;

const CAPTCHA_TTL: Duration = Duration::from_secs(300);
/// Unanswered challenges kept at once. The oldest is evicted beyond this.
const MAX_PENDING: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct CaptchaChallenge {
    pub id: String,
    pub question: String,
}

pub struct CaptchaStore {
    pending: Mutex<HashMap<String, (i32, Instant)>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for CaptchaStore {
    fn default() -> Self { Self::with_limits(CAPTCHA_TTL, MAX_PENDING) }
}

/// `a op b` with operands in 1..=9.
fn puzzle() -> (String, i32) {
    let mut rng = rand::thread_rng();
    let a: i32 = rng.gen_range(1..=9);
    let b: i32 = rng.gen_range(1..=9);
    match rng.gen_range(0..3) {
        0 => (format!("{a} + {b} = ?"), a + b),
        1 => (format!("{a} - {b} = ?"), a - b),
        _ => (format!("{a} * {b} = ?"), a * b),
    }
}

impl CaptchaStore {
    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self { pending: Mutex::new(HashMap::new()), ttl, capacity: capacity.max(1) }
    }

    pub async fn issue(&self) -> CaptchaChallenge {
        let (question, answer) = puzzle();
        let id = uuid::Uuid::new_v4().to_string();
        let mut pending = self.pending.lock().await;
        let now = Instant::now();
        pending.retain(|_, (_, issued)| now.duration_since(*issued) < self.ttl);
        while pending.len() >= self.capacity {
            let Some(oldest) = pending.iter().min_by_key(|(_, (_, issued))| *issued).map(|(id, _)| id.clone()) else { break };
            pending.remove(&oldest);
        }
        pending.insert(id.clone(), (answer, now));
        CaptchaChallenge { id, question }
    }

    /// Consumes the challenge whether or not the answer is right.
    pub async fn verify(&self, id: &str, answer: &str) -> bool {
        let Some((expected, issued)) = self.pending.lock().await.remove(id) else { return false };
        issued.elapsed() < self.ttl && answer.trim().parse::<i32>().ok() == Some(expected)
    }

    #[cfg(test)]
    async fn pending_count(&self) -> usize { self.pending.lock().await.len() }

    #[cfg(test)]
    async fn answer_of(&self, id: &str) -> Option<i32> {
        self.pending.lock().await.get(id).map(|(a, _)| *a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_correct_answer_is_single_use() {
        let store = CaptchaStore::default();
        let challenge = store.issue().await;
        assert!(challenge.question.ends_with("= ?"));
        let answer = store.answer_of(&challenge.id).await.unwrap();
        assert!(store.verify(&challenge.id, &format!(" {answer} ")).await);
        assert!(!store.verify(&challenge.id, &answer.to_string()).await);
    }
    #[tokio::test]
    async fn test_wrong_answer_consumes_challenge() {
        let store = CaptchaStore::default();
        let challenge = store.issue().await;
        let answer = store.answer_of(&challenge.id).await.unwrap();
        assert!(!store.verify(&challenge.id, "not a number").await);
        assert!(!store.verify(&challenge.id, &answer.to_string()).await);
        assert!(!store.verify("unknown", "1").await);
    }
    #[tokio::test]
    async fn test_expired_challenge_rejected() {
        let store = CaptchaStore::with_limits(Duration::ZERO, MAX_PENDING);
        let challenge = store.issue().await;
        assert!(!store.verify(&challenge.id, "0").await);
    }
    #[tokio::test]
    async fn test_pending_challenges_are_capped() {
        let store = CaptchaStore::with_limits(CAPTCHA_TTL, 3);
        let first = store.issue().await;
        let first_answer = store.answer_of(&first.id).await.unwrap();
        for _ in 0..10 { store.issue().await; }
        assert_eq!(store.pending_count().await, 3);
        // The oldest challenge was evicted to make room.
        assert!(!store.verify(&first.id, &first_answer.to_string()).await);
        let latest = store.issue().await;
        let answer = store.answer_of(&latest.id).await.unwrap();
        assert!(store.verify(&latest.id, &answer.to_string()).await);
    }
    #[test]
    fn test_puzzle_answers_match_question() {
        for _ in 0..50 {
            let (question, answer) = puzzle();
            let parts: Vec<&str> = question.split_whitespace().collect();
            let (a, b): (i32, i32) = (parts[0].parse().unwrap(), parts[2].parse().unwrap());
            let expected = match parts[1] { "+" => a + b, "-" => a - b, _ => a * b };
            assert_eq!(answer, expected);
        }
    }
}
