//! Default key set of the generated bot `.env` and validation of a loaded one.
//!
//! The keys and defaults mirror what the bot's own configuration module reads;
//! the installer writes this file once and never clobbers user edits.

use crate::domain::env_file::EnvFile;

enum Kind {
    Text,
    Int,
    Float,
    Bool,
}

struct Key {
    name: &'static str,
    default: &'static str,
    kind: Kind,
    required: bool,
}

const fn text(name: &'static str, default: &'static str) -> Key {
    Key {
        name,
        default,
        kind: Kind::Text,
        required: false,
    }
}

const fn int(name: &'static str, default: &'static str) -> Key {
    Key {
        name,
        default,
        kind: Kind::Int,
        required: true,
    }
}

const fn float(name: &'static str, default: &'static str) -> Key {
    Key {
        name,
        default,
        kind: Kind::Float,
        required: true,
    }
}

const fn boolean(name: &'static str, default: &'static str) -> Key {
    Key {
        name,
        default,
        kind: Kind::Bool,
        required: true,
    }
}

struct Section {
    title: &'static str,
    keys: &'static [Key],
}

const SECTIONS: &[Section] = &[
    Section {
        title: "Basic trading configuration",
        keys: &[
            Key {
                name: "SYMBOL",
                default: "GC=F",
                kind: Kind::Text,
                required: true,
            },
            Key {
                name: "TIMEFRAME",
                default: "1h",
                kind: Kind::Text,
                required: true,
            },
            int("CANDLE_LIMIT", "1000"),
        ],
    },
    Section {
        title: "Indicators",
        keys: &[
            int("RSI_PERIOD", "14"),
            float("RSI_OVERSOLD", "30"),
            float("RSI_OVERBOUGHT", "70"),
            float("RSI_CONFIRM_LOW", "35"),
            float("RSI_CONFIRM_HIGH", "65"),
            int("SMA_PERIOD", "20"),
            float("FVG_THRESHOLD", "0.1"),
        ],
    },
    Section {
        title: "Scheduler and logging",
        keys: &[
            int("SCHEDULE_INTERVAL_MINUTES", "60"),
            text("LOG_LEVEL", "INFO"),
            text("TIMEZONE", "Asia/Tehran"),
        ],
    },
    Section {
        title: "AI model",
        keys: &[
            float("AI_CONFIDENCE_THRESHOLD", "0.7"),
            int("AI_TRAINING_CANDLE_LIMIT", "2000"),
            int("AI_TARGET_N_FUTURE_CANDLES", "5"),
            float("AI_TARGET_PROFIT_PCT", "0.01"),
            float("AI_TARGET_STOP_LOSS_PCT", "0.01"),
            text("MODEL_PATH", "model.pkl"),
            text("MODEL_FEATURES_PATH", "model_features.pkl"),
        ],
    },
    Section {
        title: "ICT analysis",
        keys: &[
            int("ICT_SWING_LOOKBACK_PERIODS", "5"),
            int("ICT_MSS_SWING_LOOKBACK", "10"),
            float("ICT_OB_MIN_BODY_RATIO", "0.3"),
            int("ICT_OB_LOOKBACK_FOR_MSS", "15"),
            int("ICT_PD_ARRAY_LOOKBACK_PERIODS", "60"),
            text("ICT_PD_RETRACEMENT_LEVELS", "0.5,0.618,0.786"),
            int("ICT_SWEEP_MSS_LOOKBACK_CANDLES", "10"),
        ],
    },
    Section {
        title: "Higher timeframe analysis",
        keys: &[
            text("HTF_TIMEFRAMES", "1d,4h"),
            int("HTF_LOOKBACK_CANDLES", "1000"),
            boolean("HTF_BIAS_CONSENSUS_REQUIRED", "false"),
        ],
    },
    Section {
        title: "Telegram",
        keys: &[
            text("TELEGRAM_BOT_TOKEN", ""),
            text("TELEGRAM_CHAT_ID", ""),
            boolean("TELEGRAM_ENABLED", "true"),
        ],
    },
    Section {
        title: "Risk management",
        keys: &[
            boolean("RISK_MANAGEMENT_ENABLED", "true"),
            int("MAX_DAILY_SIGNALS", "5"),
            int("SIGNAL_COOLDOWN_MINUTES", "30"),
        ],
    },
];

/// Builds the `.env` the installer writes on first install.
pub fn default_env_file() -> EnvFile {
    let mut env = EnvFile::new();
    env.comment("FlowAI-ICT Trading Bot configuration");
    env.comment("Generated by flowaictl; edit values freely, the manager only rewrites");
    env.comment("individual lines it is asked to change.");

    for section in SECTIONS {
        env.blank();
        env.comment(section.title);
        for key in section.keys {
            // Keys are static and well-formed, set cannot fail here
            let _ = env.set(key.name, key.default);
        }
    }

    env
}

/// Outcome of validating a user-edited `.env` against the schema.
#[derive(Debug, Default, serde::Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

fn parses_bool(value: &str) -> bool {
    // python-dotenv consumers accept these spellings
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "false" | "1" | "0" | "yes" | "no" | "on" | "off"
    )
}

pub fn validate(env: &EnvFile) -> ValidationReport {
    let mut report = ValidationReport::default();

    for section in SECTIONS {
        for key in section.keys {
            let value = match env.get(key.name) {
                Some(v) => v.trim(),
                None => {
                    if key.required {
                        report.errors.push(format!("missing key {}", key.name));
                    } else {
                        report
                            .warnings
                            .push(format!("key {} not set, bot will use its default", key.name));
                    }
                    continue;
                }
            };

            if value.is_empty() {
                match key.name {
                    // Empty Telegram credentials are common on fresh installs
                    "TELEGRAM_BOT_TOKEN" | "TELEGRAM_CHAT_ID" => {
                        report
                            .warnings
                            .push(format!("{} is empty, Telegram delivery will fail", key.name));
                    }
                    _ if key.required => {
                        report.errors.push(format!("{} is empty", key.name));
                    }
                    _ => {}
                }
                continue;
            }

            let ok = match key.kind {
                Kind::Text => true,
                Kind::Int => value.parse::<i64>().is_ok(),
                Kind::Float => value.parse::<f64>().is_ok(),
                Kind::Bool => parses_bool(value),
            };

            if !ok {
                report.errors.push(format!(
                    "{}={:?} does not parse as {}",
                    key.name,
                    value,
                    match key.kind {
                        Kind::Text => "text",
                        Kind::Int => "an integer",
                        Kind::Float => "a number",
                        Kind::Bool => "a boolean",
                    }
                ));
            }
        }
    }

    report
}

/// Keys the interactive config editor walks through, in prompt order.
pub const EDITOR_KEYS: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "TELEGRAM_ENABLED",
    "SYMBOL",
    "TIMEFRAME",
    "SCHEDULE_INTERVAL_MINUTES",
    "AI_CONFIDENCE_THRESHOLD",
    "MAX_DAILY_SIGNALS",
    "LOG_LEVEL",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_env_file_is_valid() {
        let env = default_env_file();
        let report = validate(&env);
        assert!(report.is_ok(), "errors: {:?}", report.errors);
        // Fresh install has no Telegram credentials yet
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("TELEGRAM_BOT_TOKEN")));
    }

    #[test]
    fn test_default_env_file_parses_back() {
        let text = default_env_file().render();
        let env = EnvFile::parse(&text).unwrap();
        assert_eq!(env.get("SYMBOL"), Some("GC=F"));
        assert_eq!(env.get("SCHEDULE_INTERVAL_MINUTES"), Some("60"));
        assert_eq!(env.get("ICT_PD_RETRACEMENT_LEVELS"), Some("0.5,0.618,0.786"));
    }

    #[test]
    fn test_validate_flags_bad_types() {
        let mut env = default_env_file();
        env.set("RSI_PERIOD", "fourteen").unwrap();
        env.set("TELEGRAM_ENABLED", "maybe").unwrap();

        let report = validate(&env);
        assert!(!report.is_ok());
        assert!(report.errors.iter().any(|e| e.contains("RSI_PERIOD")));
        assert!(report.errors.iter().any(|e| e.contains("TELEGRAM_ENABLED")));
    }

    #[test]
    fn test_validate_flags_missing_required() {
        let mut env = default_env_file();
        env.remove("SYMBOL");

        let report = validate(&env);
        assert!(report.errors.iter().any(|e| e.contains("SYMBOL")));
    }
}
