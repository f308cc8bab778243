//! Raw vendor resource ids -> display slot labels.
//! Each domain has an ordered rule list; the first rule whose marker occurs in
//! the id rewrites it, and an id no rule matches is returned unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierLocale {
    #[default]
    Zh,
    En,
}

/// Localized labels substituted into display ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLabels {
    pub disk_slot: &'static str,
    pub sd_card: &'static str,
    pub memory_slot: &'static str,
}

impl SlotLabels {
    pub const fn for_locale(locale: IdentifierLocale) -> Self {
        match locale {
            IdentifierLocale::Zh => Self {
                disk_slot: "磁盘槽",
                sd_card: "主板SD卡",
                memory_slot: "内存槽",
            },
            IdentifierLocale::En => Self {
                disk_slot: "Disk Slot",
                sd_card: "Mainboard SD Card",
                memory_slot: "Memory Slot",
            },
        }
    }
}

#[derive(Clone, Copy)]
enum Label {
    DiskSlot,
    SdCard,
    MemorySlot,
}

impl SlotLabels {
    fn get(&self, label: Label) -> &'static str {
        match label {
            Label::DiskSlot => self.disk_slot,
            Label::SdCard => self.sd_card,
            Label::MemorySlot => self.memory_slot,
        }
    }
}

impl Default for SlotLabels {
    fn default() -> Self {
        Self::for_locale(IdentifierLocale::default())
    }
}

enum Rewrite {
    /// Replace every occurrence of the marker with a label.
    Replace(Label),
    /// Keep the part before the first ':' then replace `from` with a label.
    TruncateThenReplace {
        from: &'static str,
        label: Label,
    },
    /// Replace the marker with a label, then replace `extra.0` with `extra.1`.
    ReplaceThen {
        label: Label,
        extra: (&'static str, &'static str),
    },
}

struct Rule {
    marker: &'static str,
    rewrite: Rewrite,
}

const DRIVE_RULES: &[Rule] = &[
    Rule {
        marker: "HDDPlaneDisk",
        rewrite: Rewrite::Replace(Label::DiskSlot),
    },
    Rule {
        marker: "mainboardSDCard",
        rewrite: Rewrite::Replace(Label::SdCard),
    },
    // iDRAC: "Disk.Bay.3:Enclosure.Internal.0-1:RAID.Integrated.1-1"
    Rule {
        marker: ":Enclosure.Internal",
        rewrite: Rewrite::TruncateThenReplace {
            from: "Disk.Bay.",
            label: Label::DiskSlot,
        },
    },
];

const MEMORY_RULES: &[Rule] = &[
    // Huawei: "mainboardDIMM.Socket.000" style ids
    Rule {
        marker: "mainboardDIMM",
        rewrite: Rewrite::ReplaceThen {
            label: Label::MemorySlot,
            extra: (".Socket.", "-"),
        },
    },
    Rule {
        marker: "DIMM.Socket",
        rewrite: Rewrite::Replace(Label::MemorySlot),
    },
    Rule {
        marker: "DIMM",
        rewrite: Rewrite::Replace(Label::MemorySlot),
    },
];

fn apply(rules: &[Rule], raw: &str, labels: &SlotLabels) -> String {
    let Some(rule) = rules.iter().find(|r| raw.contains(r.marker)) else {
        return raw.to_string();
    };

    match &rule.rewrite {
        Rewrite::Replace(label) => raw.replace(rule.marker, labels.get(*label)),
        Rewrite::TruncateThenReplace { from, label } => {
            let head = raw.split(':').next().unwrap_or(raw);
            head.replace(*from, labels.get(*label))
        }
        Rewrite::ReplaceThen { label, extra } => raw
            .replace(rule.marker, labels.get(*label))
            .replace(extra.0, extra.1),
    }
}

pub fn normalize_drive_id(raw: &str, labels: &SlotLabels) -> String {
    apply(DRIVE_RULES, raw, labels)
}

pub fn normalize_memory_id(raw: &str, labels: &SlotLabels) -> String {
    apply(MEMORY_RULES, raw, labels)
}
