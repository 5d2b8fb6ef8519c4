/// Canned demo prompts that can be loaded into the message input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    PasswordReset,
    PtoBalance,
    AccountStatus,
    HrPolicy,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::PasswordReset => "password-reset",
            Scenario::PtoBalance => "pto-balance",
            Scenario::AccountStatus => "account-status",
            Scenario::HrPolicy => "hr-policy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "password-reset" | "passwordreset" => Some(Scenario::PasswordReset),
            "pto-balance" | "ptobalance" => Some(Scenario::PtoBalance),
            "account-status" | "accountstatus" => Some(Scenario::AccountStatus),
            "hr-policy" | "hrpolicy" => Some(Scenario::HrPolicy),
            _ => None,
        }
    }

    pub fn all() -> Vec<Scenario> {
        vec![
            Scenario::PasswordReset,
            Scenario::PtoBalance,
            Scenario::AccountStatus,
            Scenario::HrPolicy,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Scenario::PasswordReset => "Password reset",
            Scenario::PtoBalance => "PTO balance",
            Scenario::AccountStatus => "Account status",
            Scenario::HrPolicy => "HR policy",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Scenario::PasswordReset => {
                "I can't log into my account, I think I need a password reset"
            }
            Scenario::PtoBalance => "How many PTO days do I have left?",
            Scenario::AccountStatus => "Can you check my account status?",
            Scenario::HrPolicy => "What's the vacation time policy?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_common_spellings() {
        assert_eq!(Scenario::from_str("pto-balance"), Some(Scenario::PtoBalance));
        assert_eq!(Scenario::from_str("ptoBalance"), Some(Scenario::PtoBalance));
        assert_eq!(Scenario::from_str("HR_POLICY"), Some(Scenario::HrPolicy));
        assert_eq!(Scenario::from_str("weather"), None);
    }

    #[test]
    fn test_round_trip_names() {
        for scenario in Scenario::all() {
            assert_eq!(Scenario::from_str(scenario.as_str()), Some(scenario));
        }
    }
}
