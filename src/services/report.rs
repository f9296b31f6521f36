use crate::metrics::ScanMetrics;
use crate::services::disenchant::Bucket;

const BANNER: &str = "============================================";
const RULE: &str = "--------------";

const PATCHED_HEADER: &str = "Successfully patched items:";
const SKIPPED_HEADER: &str = "Items with an empty enchantment field or items that have conditions requiring specific keywords and/or equipped items:";
const MANUAL_CHECK_HEADER: &str = "Items with non-quest scripts attached (Abilities might be partially contained within scripts rather than enchantment only):";

/// Editor IDs sorted into the three report lists, in scan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchReport {
    pub patched: Vec<String>,
    pub skipped: Vec<String>,
    pub manual_check: Vec<String>,
    pub metrics: ScanMetrics,
}

impl PatchReport {
    pub fn push(&mut self, bucket: Bucket, editor_id: &str) {
        self.list_mut(bucket).push(editor_id.to_string());
    }

    pub fn list(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Patched => &self.patched,
            Bucket::Skipped => &self.skipped,
            Bucket::ManualCheck => &self.manual_check,
        }
    }

    fn list_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::Patched => &mut self.patched,
            Bucket::Skipped => &mut self.skipped,
            Bucket::ManualCheck => &mut self.manual_check,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patched.is_empty() && self.skipped.is_empty() && self.manual_check.is_empty()
    }

    /// Console report. Empty lists are left out.
    pub fn render(&self) -> String {
        let sections = [
            (PATCHED_HEADER, &self.patched),
            (SKIPPED_HEADER, &self.skipped),
            (MANUAL_CHECK_HEADER, &self.manual_check),
        ];

        let mut out = String::new();
        for (header, names) in sections {
            if names.is_empty() {
                continue;
            }

            out.push_str(&format!("\n\n{BANNER}\n\n{header}\n{RULE}\n"));
            for name in names {
                out.push_str(name);
                out.push('\n');
            }
        }
        out
    }
}
