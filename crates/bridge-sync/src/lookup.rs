//! Declarative transformation rules for constrained destination properties.
//!
//! Each semantically-constrained destination property (status, source,
//! stage, type fields) carries a [`LookupTable`] from normalized source
//! values to the destination's accepted enumeration. Multi-value tag-like
//! properties instead carry a join rule. The registry maps record type and
//! destination property to its rule, so the transformer is data-driven
//! dispatch rather than per-property branching.

use std::collections::HashMap;

use bridge_core::RecordType;

/// Delimiter used when joining multi-value lists for the destination.
pub const LIST_DELIMITER: &str = ";";

/// Normalize a raw source value for lookup: trim and lower-case.
#[must_use]
pub fn normalize_value(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A mapping from normalized source value to destination enumeration value.
///
/// Lookup is total only for known values; unknown inputs return `None` and
/// the caller skips the property.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: HashMap<String, String>,
}

impl LookupTable {
    /// Build a table from raw pairs, normalizing the keys.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(k, v)| (normalize_value(k), (*v).to_string()))
                .collect(),
        }
    }

    /// Look up a raw source value.
    #[must_use]
    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(&normalize_value(raw)).map(String::as_str)
    }

    /// Number of known values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a constrained destination property is transformed.
#[derive(Debug, Clone)]
pub enum TransformRule {
    /// Look the normalized value up; skip the property on a miss.
    Enumerated(LookupTable),
    /// Join list elements with [`LIST_DELIMITER`].
    MultiValue {
        /// Write `""` when the list is empty or the field absent, instead
        /// of skipping. Used for tag-like properties the destination
        /// expects to always be present.
        empty_when_missing: bool,
    },
}

/// Record type and destination property to transformation rule.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    rules: HashMap<(RecordType, String), TransformRule>,
}

impl TransformRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for a destination property of a record type.
    pub fn insert(
        &mut self,
        record_type: RecordType,
        property: impl Into<String>,
        rule: TransformRule,
    ) {
        self.rules.insert((record_type, property.into()), rule);
    }

    /// The rule for a destination property, if one is registered.
    #[must_use]
    pub fn get(&self, record_type: RecordType, property: &str) -> Option<&TransformRule> {
        self.rules.get(&(record_type, property.to_string()))
    }

    /// The registry used in production: the deployed enumeration tables
    /// and multi-value join rules for every synchronized record type.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        let email_status = LookupTable::from_pairs(&[
            ("-None-", "NONE"),
            ("Request is in progress", "Request is in progress"),
            ("Real", "Existing"),
            ("Fake", "Nonexistent"),
            ("Unknown", "Unknown"),
            ("Out of limit", "Out of limit"),
            ("Safe to send", "Safe to send"),
        ]);

        let lead_status = LookupTable::from_pairs(&[
            ("-None-", "NONE"),
            ("Qualified", "QUALIFIED"),
            ("Is Not Qualified", "IS_NOT_QUALIFIED"),
            ("SQL Qualified", "SQL_QUALIFIED"),
            ("Not Qualified", "NOT_QUALIFIED"),
            ("Unknown", "UNKNOWN"),
            ("Prospect", "PROSPECT"),
            ("Do Not Call", "DO_NOT_CALL"),
            ("Do Not Contact", "DO_NOT_CONTACT"),
            ("Customer", "CUSTOMER"),
            ("Pre-Qualified", "PRE_QUALIFIED"),
            ("Contacted", "CONTACTED"),
            ("Contact in Future", "CONTACT_IN_FUTURE"),
            ("Not Contacted", "NOT_CONTACTED"),
            ("Attempted to Contact", "ATTEMPTED_TO_CONTACT"),
            ("Lost Lead", "LOST_LEAD"),
            ("Meeting - Pending", "MEETING_PENDING"),
            ("Nurture", "NURTURE"),
            ("Meeting - Booked", "MEETING_BOOKED"),
            ("Channel Partner", "CHANNEL_PARTNER"),
            ("Imported", "IMPORTED"),
            ("PPC - New", "PPC_NEW"),
            ("Warm", "WARM"),
            ("Call me", "CALL_ME"),
            ("Inactive", "INACTIVE"),
            ("Email 4", "EMAIL_4"),
            ("Called", "CALLED"),
            ("No Phone Number", "NO_PHONE_NUMBER"),
            ("Left Voicemail", "LEFT_VOICEMAIL"),
            ("New Lead", "NEW"),
            ("Open", "OPEN"),
            ("In Progress", "IN_PROGRESS"),
            ("Open Deal", "OPEN_DEAL"),
            ("Unqualified", "UNQUALIFIED"),
            ("Connected", "CONNECTED"),
            ("Bad Timing", "BAD_TIMING"),
        ]);

        let lead_type = LookupTable::from_pairs(&[
            ("critical", "Critical"),
            ("hot", "Hot"),
            ("warm", "Warm"),
            ("cold", "Cold"),
            ("-none-", "-None-"),
        ]);

        let lead_source = LookupTable::from_pairs(&[
            ("-none-", "-None-"),
            ("growth", "Growth"),
            ("organic", "Organic"),
            ("outbound", "Outbound"),
            ("inside sales", "Inside Sales"),
            ("ppc", "PPC"),
            ("relationship", "Relationship"),
            ("demo account", "Demo Account"),
            ("app free trial", "APP_FREE_TRIAL"),
            ("awareness", "AWARENESS"),
            ("casestudydoctustechhelpsboostrafaccuracy", "CASESTUDY"),
            ("changes between hcc v24 and hcc v28", "VERSION_CHANGES"),
            ("cold call", "COLD_CALL"),
            ("cold linkedin outreach", "LINKEDIN_OUTREACH"),
            ("compliance sme interview", "COMPLIANCE_INTERVIEW"),
            ("demo account user", "DEMO_USER"),
            ("discovery", "DISCOVERY"),
            ("ebook measuring the value of value-based care", "EBOOK_VALUE_CARE"),
            ("email", "EMAIL"),
            ("existing customer", "EXISTING_CUSTOMER"),
            ("facebook ads", "FACEBOOK_ADS"),
            ("hcc audits compliance", "HCC_COMPLIANCE"),
            ("hcc quick guide", "HCC_GUIDE"),
            ("integrated platform contact", "INTEGRATED_CONTACT"),
            ("lead gen form", "LEAD_GEN_FORM"),
            ("learn about app", "LEARN_ABOUT_APP"),
            ("learn more - performance max campaign", "PERFORMANCE_MAX"),
            ("learn with app", "LEARN_APP"),
            ("learn with doctus", "LEARN_DOCTUS"),
            ("learn with doctustech", "LEARN_DOCTUSTECH"),
            ("learn with mobile app", "LEARN_MOBILE_APP"),
            ("linkedin ads", "LINKEDIN_ADS"),
            ("linkedin form", "LINKEDIN_FORM"),
            ("linkedin sales search", "LINKEDIN_SALES_SEARCH"),
            ("ob aco", "OB_ACO"),
            ("ob athena", "OB_ATHENA"),
            ("ob persona", "OB_PERSONA"),
            ("ob re-engaged", "OB_RE-ENGAGED"),
            ("personal network", "PERSONAL_NETWORK"),
            ("radv whitepaper", "RADV_WHITEPAPER"),
            ("raf revenue calculator", "RAF_REVENUE_CALCULATOR"),
            ("referral", "REFERRAL"),
            ("risk adjustment one pager", "RISK_ADJUSTMENT_ONE_PAGER"),
            ("roi calculator", "ROI_Calculator"),
            ("schedule_a_demo", "SCHEDULE1_A_DEMO"),
            ("scupdap", "SCUPDAP"),
            ("seamless", "SEAMLESS"),
            ("site contact us", "SITE_CONTACT_US"),
            ("tradeshow", "TRADESHOW"),
            ("visitor insites", "VISITOR_INSITES"),
            ("webinar", "WEBINAR"),
            ("zoominfo", "ZOOMINFO"),
            ("warm", "WARM"),
        ]);

        let lead_source_type = LookupTable::from_pairs(&[
            ("-none-", "-None-"),
            ("demo account", "Demo Account"),
            ("expansion", "Expansion"),
            ("growth", "Growth"),
            ("inside sales", "Inside Sales"),
            ("organic", "Organic"),
            ("ppc", "PPC"),
            ("relationship", "Relationship"),
        ]);

        let lead_stage = LookupTable::from_pairs(&[
            ("-none-", "-None-"),
            ("intro meeting", "Option 2"),
            ("discovery meeting", "Value Proposition (40%)"),
            ("qualified", "Option 1"),
            ("proposal", "Proposal"),
            ("contracting", "Contracting"),
            ("unqualified", "Unqualified"),
            ("nurture", "Nurture"),
            ("closed lost (0%)", "Closed Lost (0%)"),
            ("proposal/quote sent (75%)", "Proposal/Quote Sent (75%)"),
            ("closed won (100%)", "Closed Won (100%)"),
            ("identify decision makers (60%)", "Identify Decision Makers (60%)"),
            ("negotiation/review (90%)", "Negotiation/Review (90%)"),
        ]);

        let meeting_scheduled = LookupTable::from_pairs(&[
            ("yes", "Option 1"),
            ("no", "Option 2"),
            ("pending", "Pending"),
            ("-none-", "-None-"),
        ]);

        for record_type in [RecordType::Contact, RecordType::Lead] {
            registry.insert(
                record_type,
                "zohocheckeremail__email_status",
                TransformRule::Enumerated(email_status.clone()),
            );
            registry.insert(
                record_type,
                "zohocheckeremail__secondary_email_status",
                TransformRule::Enumerated(email_status.clone()),
            );
            registry.insert(
                record_type,
                "lead_contact_status",
                TransformRule::Enumerated(lead_status.clone()),
            );
            registry.insert(
                record_type,
                "lead_type",
                TransformRule::Enumerated(lead_type.clone()),
            );
            registry.insert(
                record_type,
                "lead_source",
                TransformRule::Enumerated(lead_source.clone()),
            );
            registry.insert(
                record_type,
                "lead_source_type",
                TransformRule::Enumerated(lead_source_type.clone()),
            );
            registry.insert(
                record_type,
                "lead_stage",
                TransformRule::Enumerated(lead_stage.clone()),
            );
            registry.insert(
                record_type,
                "meeting_scheduled",
                TransformRule::Enumerated(meeting_scheduled.clone()),
            );

            for property in ["meeting_type", "program", "linkedin_connected"] {
                registry.insert(
                    record_type,
                    property,
                    TransformRule::MultiValue {
                        empty_when_missing: false,
                    },
                );
            }
            registry.insert(
                record_type,
                "tag",
                TransformRule::MultiValue {
                    empty_when_missing: true,
                },
            );
        }

        registry.insert(
            RecordType::Deal,
            "lead_source",
            TransformRule::Enumerated(lead_source),
        );
        registry.insert(
            RecordType::Deal,
            "lead_stage",
            TransformRule::Enumerated(lead_stage),
        );

        registry
    }
}
