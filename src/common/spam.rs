// src/common/spam.rs

// Heurísticas anti-bot dos formulários. Não são controle de segurança:
// quem for barrado recebe um sucesso falso e nada é gravado.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    Clean,
    Honeypot,
    TooFast { elapsed_ms: i64 },
}

impl SpamVerdict {
    pub fn is_spam(&self) -> bool {
        !matches!(self, SpamVerdict::Clean)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpamFilter {
    pub min_elapsed_ms: i64,
}

impl SpamFilter {
    pub fn new(min_elapsed_ms: i64) -> Self {
        Self { min_elapsed_ms }
    }

    /// `form_load_time_ms` e `now_ms` em milissegundos desde a época Unix.
    /// Sem timestamp de carregamento a checagem de tempo é ignorada.
    pub fn check(
        &self,
        honeypot: Option<&str>,
        form_load_time_ms: Option<i64>,
        now_ms: i64,
    ) -> SpamVerdict {
        if honeypot.is_some_and(|value| !value.is_empty()) {
            return SpamVerdict::Honeypot;
        }

        if let Some(loaded_at) = form_load_time_ms {
            let elapsed_ms = now_ms.saturating_sub(loaded_at);
            if elapsed_ms < self.min_elapsed_ms {
                return SpamVerdict::TooFast { elapsed_ms };
            }
        }

        SpamVerdict::Clean
    }

    pub fn check_now(&self, honeypot: Option<&str>, form_load_time_ms: Option<i64>) -> SpamVerdict {
        self.check(honeypot, form_load_time_ms, chrono::Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn any_honeypot_value_is_spam() {
        let filter = SpamFilter::new(3000);
        assert_eq!(filter.check(Some("x"), None, NOW), SpamVerdict::Honeypot);
        assert_eq!(filter.check(Some(" "), Some(NOW - 60_000), NOW), SpamVerdict::Honeypot);
        assert_eq!(filter.check(Some(""), None, NOW), SpamVerdict::Clean);
    }

    #[test]
    fn fast_submissions_are_spam() {
        let filter = SpamFilter::new(3000);
        assert_eq!(
            filter.check(None, Some(NOW - 2999), NOW),
            SpamVerdict::TooFast { elapsed_ms: 2999 }
        );
        assert_eq!(filter.check(None, Some(NOW - 3000), NOW), SpamVerdict::Clean);
        // relógio do cliente adiantado
        assert!(filter.check(None, Some(NOW + 10), NOW).is_spam());
    }

    #[test]
    fn newsletter_threshold_is_lower() {
        let filter = SpamFilter::new(2000);
        assert_eq!(filter.check(None, Some(NOW - 2500), NOW), SpamVerdict::Clean);
    }

    #[test]
    fn missing_load_time_skips_timing() {
        let filter = SpamFilter::new(3000);
        assert_eq!(filter.check(None, None, NOW), SpamVerdict::Clean);
    }
}
