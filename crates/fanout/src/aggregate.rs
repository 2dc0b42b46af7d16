//! Aggregation: collapse nodes with byte-identical output into one block.
//!
//! Grouping works on the captured, untagged output of each result, so
//! tagging never makes identical output look different. Groups appear
//! in the order their first member appears in the input, which makes
//! the reduction order-stable and idempotent.

use crate::result::DispatchResult;
use crate::sink::OutputSink;
use std::collections::HashMap;

/// Nodes that produced the same output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputGroup {
    /// Member node names in input order
    pub nodes: Vec<String>,
    /// The shared output; `None` for nodes that did not run
    pub output: Option<Vec<u8>>,
}

impl OutputGroup {
    /// Compact label for the members, e.g. `web[1-3],db1`.
    pub fn label(&self) -> String {
        compact_nodes(&self.nodes)
    }
}

/// Group results by exact output bytes.
///
/// Empty output ("ran, printed nothing") and no output ("did not run")
/// form separate groups.
pub fn aggregate(results: &[DispatchResult]) -> Vec<OutputGroup> {
    let mut groups: Vec<OutputGroup> = Vec::new();
    let mut index: HashMap<Option<&[u8]>, usize> = HashMap::new();

    for result in results {
        let key = result.output.as_deref();
        match index.get(&key) {
            Some(&i) => groups[i].nodes.push(result.node.clone()),
            None => {
                index.insert(key, groups.len());
                groups.push(OutputGroup {
                    nodes: vec![result.node.clone()],
                    output: result.output.clone(),
                });
            }
        }
    }
    groups
}

/// Write groups to a sink, each output line tagged with the group label.
pub fn render(groups: &[OutputGroup], sink: &OutputSink) {
    for group in groups {
        let label = group.label();
        match group.output.as_deref() {
            None => sink.line(Some(&label), b"(did not run)"),
            Some([]) => sink.line(Some(&label), b"(no output)"),
            Some(output) => {
                for line in output.split_inclusive(|&b| b == b'\n') {
                    sink.line(Some(&label), line);
                }
            }
        }
    }
}

/// Fold node names into pdsh-style ranges.
///
/// Names sharing a prefix and a numeric suffix of the same padding are
/// folded (`web1,web2,web3` → `web[1-3]`); other names are kept as-is.
/// An unpadded suffix as long as a padded one joins its range
/// (`node01,node10` → `node[01,10]`). Prefixes keep the order in which
/// they first appear.
pub fn compact_nodes<S: AsRef<str>>(names: &[S]) -> String {
    let padded: Vec<(&str, usize)> = names
        .iter()
        .filter_map(|name| split_numeric(name.as_ref()))
        .filter(|&(_, width, _)| width > 0)
        .map(|(prefix, width, _)| (prefix, width))
        .collect();

    let mut order: Vec<Entry> = Vec::new();

    for name in names {
        let name = name.as_ref();
        match split_numeric(name) {
            Some((prefix, width, number)) => {
                let digits = name.len() - prefix.len();
                let width = if width == 0 && padded.contains(&(prefix, digits)) {
                    digits
                } else {
                    width
                };
                let position = order.iter().position(|e| {
                    matches!(e, Entry::Numbered { prefix: p, width: w, .. } if *p == prefix && *w == width)
                });
                match position {
                    Some(i) => {
                        if let Entry::Numbered { numbers, .. } = &mut order[i] {
                            numbers.push(number);
                        }
                    }
                    None => order.push(Entry::Numbered {
                        prefix,
                        width,
                        numbers: vec![number],
                    }),
                }
            }
            None => {
                if !order.iter().any(|e| matches!(e, Entry::Plain(n) if *n == name)) {
                    order.push(Entry::Plain(name));
                }
            }
        }
    }

    order
        .into_iter()
        .map(|entry| match entry {
            Entry::Plain(name) => name.to_string(),
            Entry::Numbered {
                prefix,
                width,
                mut numbers,
            } => {
                numbers.sort_unstable();
                numbers.dedup();
                if let [only] = numbers[..] {
                    format!("{prefix}{only:0width$}")
                } else {
                    format!("{prefix}[{}]", fold_ranges(&numbers, width))
                }
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

enum Entry<'a> {
    Plain(&'a str),
    Numbered {
        prefix: &'a str,
        width: usize,
        numbers: Vec<u64>,
    },
}

/// Split `web07` into (`web`, 2, 7). Unpadded suffixes get width 0.
fn split_numeric(name: &str) -> Option<(&str, usize, u64)> {
    let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let (prefix, suffix) = name.split_at(name.len() - digits);
    let number = suffix.parse().ok()?;
    let width = if suffix.len() > 1 && suffix.starts_with('0') {
        suffix.len()
    } else {
        0
    };
    Some((prefix, width, number))
}

fn fold_ranges(sorted: &[u64], width: usize) -> String {
    let mut parts = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let start = sorted[i];
        let mut end = start;
        while i + 1 < sorted.len() && sorted[i + 1] == end + 1 {
            i += 1;
            end = sorted[i];
        }
        if start == end {
            parts.push(format!("{start:0width$}"));
        } else {
            parts.push(format!("{start:0width$}-{end:0width$}"));
        }
        i += 1;
    }
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::TaskStatus;
    use crate::sink::SharedBuffer;

    fn result(node: &str, output: Option<&str>) -> DispatchResult {
        DispatchResult {
            rank: 0,
            node: node.to_string(),
            command: None,
            status: TaskStatus::Success,
            output: output.map(|o| o.as_bytes().to_vec()),
        }
    }

    #[test]
    fn test_identical_outputs_share_a_group() {
        let results = vec![
            result("web1", Some("ok\n")),
            result("db1", Some("drift\n")),
            result("web2", Some("ok\n")),
        ];
        let groups = aggregate(&results);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].nodes, vec!["web1", "web2"]);
        assert_eq!(groups[0].output.as_deref(), Some(&b"ok\n"[..]));
        assert_eq!(groups[1].nodes, vec!["db1"]);
    }

    #[test]
    fn test_different_outputs_never_share() {
        let results = vec![result("a", Some("x\n")), result("b", Some("x"))];
        assert_eq!(aggregate(&results).len(), 2);
    }

    #[test]
    fn test_empty_and_missing_output_are_distinct() {
        let results = vec![
            result("a", Some("")),
            result("b", None),
            result("c", Some("")),
            result("d", None),
        ];
        let groups = aggregate(&results);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].nodes, vec!["a", "c"]);
        assert_eq!(groups[0].output, Some(Vec::new()));
        assert_eq!(groups[1].nodes, vec!["b", "d"]);
        assert_eq!(groups[1].output, None);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let results = vec![
            result("n3", Some("b\n")),
            result("n1", Some("a\n")),
            result("n2", Some("b\n")),
        ];
        assert_eq!(aggregate(&results), aggregate(&results));
        assert_eq!(aggregate(&results)[0].nodes, vec!["n3", "n2"]);
    }

    #[test]
    fn test_compact_nodes_ranges() {
        assert_eq!(compact_nodes(&["web1", "web2", "web3"]), "web[1-3]");
        assert_eq!(compact_nodes(&["web1", "web3", "web2", "web5"]), "web[1-3,5]");
        assert_eq!(compact_nodes(&["web1", "db1", "web2", "lb"]), "web[1-2],db1,lb");
        assert_eq!(compact_nodes(&["node01", "node02", "node10"]), "node[01-02,10]");
        assert_eq!(compact_nodes(&["n1", "n1"]), "n1");
        assert_eq!(compact_nodes(&["alpha", "beta"]), "alpha,beta");
        assert_eq!(compact_nodes::<&str>(&[]), "");
    }

    #[test]
    fn test_compact_nodes_keeps_padding_separate() {
        assert_eq!(compact_nodes(&["n01", "n1"]), "n01,n1");
        assert_eq!(compact_nodes(&["n01", "n100"]), "n01,n100");
    }

    #[test]
    fn test_compact_nodes_unpadded_joins_padded_width() {
        assert_eq!(compact_nodes(&["node10", "node01", "node02"]), "node[01-02,10]");
        assert_eq!(compact_nodes(&["node09", "node10", "node11"]), "node[09-11]");
    }

    #[test]
    fn test_render_blocks() {
        let results = vec![
            result("web1", Some("line one\nline two\n")),
            result("web2", Some("line one\nline two\n")),
            result("db1", Some("")),
            result("db2", None),
        ];
        let buf = SharedBuffer::new();
        let sink = OutputSink::from_writer(buf.clone());
        render(&aggregate(&results), &sink);
        assert_eq!(
            buf.to_string_lossy(),
            "web[1-2]: line one\nweb[1-2]: line two\ndb1: (no output)\ndb2: (did not run)\n"
        );
    }
}
