//! Status and category enums
//!
//! Values are single-select labels owned by the remote schema. Transitions
//! are not guarded here: any label can be written, and labels this client
//! does not know round-trip unchanged through `Custom`.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

macro_rules! select_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Label unknown to this client, kept verbatim
            Custom(String),
        }

        impl $name {
            /// Labels of the known values, in schema order
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn label(&self) -> &str {
                match self {
                    $( Self::$variant => $label, )+
                    Self::Custom(label) => label,
                }
            }

            /// Known values, in schema order
            pub fn all() -> Vec<Self> {
                vec![$( Self::$variant ),+]
            }

            pub fn is_custom(&self) -> bool {
                matches!(self, Self::Custom(_))
            }
        }

        impl From<&str> for $name {
            fn from(label: &str) -> Self {
                match label.trim() {
                    $( $label => Self::$variant, )+
                    _ => Self::Custom(label.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(label: String) -> Self {
                Self::from(label.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

select_enum! {
    /// Order workflow status (`Statut commande`)
    OrderStatus {
        Pending => "En attente de confirmation",
        Confirmed => "Confirmée",
        Preparing => "En préparation",
        Ready => "Prête à récupérer",
        PickedUp => "Récupérée",
        Cancelled => "Annulée",
    }
}

select_enum! {
    /// Payment status of an order (`Statut paiement`)
    PaymentStatus {
        PendingOnSite => "En attente sur place",
        PaidOnSite => "Payé sur place",
        PaidOnline => "Payé en ligne (futur)",
        Unpaid => "Non payé",
    }
}

select_enum! {
    /// Kind of event (`Type d'événement`)
    EventType {
        Birthday => "Anniversaire",
        CompanyMeal => "Repas d'entreprise",
        FamilyParty => "Fête de famille",
        Cocktail => "Cocktail dînatoire",
        Buffet => "Buffet traiteur",
        Other => "Autre",
    }
}

select_enum! {
    /// Event request workflow status (`Statut événement`)
    EventStatus {
        InitialRequest => "Demande initiale",
        MenuDiscussion => "Menu en discussion",
        QuoteToDo => "Devis à faire",
        QuoteSent => "Devis envoyé",
        DepositPending => "Confirmé / Acompte en attente",
        DepositReceived => "Confirmé / Acompte reçu",
        Preparing => "En préparation",
        Done => "Réalisé",
        BalanceDue => "Facturé / Solde à payer",
        FullyPaid => "Payé intégralement",
        Cancelled => "Annulé",
    }
}

select_enum! {
    /// Deposit tracking status (`Statut acompte`)
    DepositStatus {
        NotApplicable => "Non applicable",
        Requested => "Demandé",
        Received => "Reçu",
    }
}

impl OrderStatus {
    /// Cancelled orders are excluded from revenue
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::PendingOnSite
    }
}

impl Default for EventStatus {
    fn default() -> Self {
        Self::InitialRequest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_round_trip() {
        for status in OrderStatus::all() {
            assert_eq!(OrderStatus::from(status.label()), status);
        }
        assert_eq!(EventStatus::LABELS.len(), 11);
        assert_eq!(
            "Confirmé / Acompte reçu".parse::<EventStatus>().unwrap(),
            EventStatus::DepositReceived
        );
    }

    #[test]
    fn test_unknown_label_kept_verbatim() {
        let status = OrderStatus::from("Livrée par drone");
        assert!(status.is_custom());
        assert_eq!(status.label(), "Livrée par drone");

        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"Livrée par drone\"");
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&PaymentStatus::PaidOnSite).unwrap();
        assert_eq!(json, "\"Payé sur place\"");

        let parsed: EventType = serde_json::from_str("\"Repas d'entreprise\"").unwrap();
        assert_eq!(parsed, EventType::CompanyMeal);
    }
}
