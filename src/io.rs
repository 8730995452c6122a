//! Plain-text reading and writing of decision diagrams.
//!
//! # File Format (.mdd)
//!
//! ```text
//! c comment line
//! omdd <nf> <n_classes>                  # header: model kind and sizes
//! f <index> <name> <domain_size> <level> # feature declaration, indices 0, 1, ...
//! p <index> <prob_0> ... <prob_{d-1}>    # optional value distribution (a/b or decimal)
//! l <id> <class>                         # leaf
//! n <id> <feature> {<value>:<child>}+    # decision node
//! r <id>                                 # root
//! ```
//!
//! Nodes appear bottom-up (children before parents). Node ids are arbitrary
//! non-negative integers, unique within the file. The model kind is checked
//! when the header is read: only `omdd` diagrams are supported.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use num_rational::BigRational;

use crate::diagram::Diagram;
use crate::distribution::FeatureDistribution;
use crate::error::{Error, Result};
use crate::mdd::{Mdd, MddBuilder, Node};
use crate::types::{Class, NodeId, Value};

/// Classifier kinds accepted by the reader.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ModelKind {
    /// Ordered multi-valued decision diagram.
    Omdd,
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "omdd" => Ok(ModelKind::Omdd),
            _ => Err(Error::UnsupportedModel(s.to_string())),
        }
    }
}

fn parse_num<T: FromStr>(token: Option<&str>, line: usize, what: &str) -> Result<T> {
    let token = token.ok_or_else(|| Error::parse(line, format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid {} '{}'", what, token)))
}

fn parse_probability(token: &str, line: usize) -> Result<BigRational> {
    if let Ok(p) = token.parse::<BigRational>() {
        return Ok(p);
    }
    token
        .parse::<f64>()
        .ok()
        .and_then(BigRational::from_float)
        .ok_or_else(|| Error::parse(line, format!("invalid probability '{}'", token)))
}

impl Mdd {
    /// Saves the diagram to a file in `.mdd` format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_mdd_string())?;
        Ok(())
    }

    /// Converts the diagram to `.mdd` format.
    pub fn to_mdd_string(&self) -> String {
        let mut output = String::new();

        // Header
        writeln!(output, "c nodes appear bottom-up, children before parents").unwrap();
        writeln!(output, "c f index name domain-size level").unwrap();
        writeln!(output, "c p index probabilities...").unwrap();
        writeln!(output, "c l id class").unwrap();
        writeln!(output, "c n id feature value:child...").unwrap();
        writeln!(output, "omdd {} {}", self.nf(), self.n_classes()).unwrap();

        for (i, f) in self.features().iter().enumerate() {
            writeln!(output, "f {} {} {} {}", i, f.name.replace(char::is_whitespace, "_"), f.domain_size, self.feature_level(i).index()).unwrap();
        }
        for i in 0..self.nf() {
            let probs: Vec<String> = self.distribution().row(i).iter().map(|p| p.to_string()).collect();
            writeln!(output, "p {} {}", i, probs.join(" ")).unwrap();
        }

        // Nodes are renumbered by their position in the postorder.
        let mut ids = HashMap::new();
        for (pos, &node) in self.postorder().iter().enumerate() {
            ids.insert(node, pos);
            match self.node(node) {
                Node::Leaf(class) => {
                    writeln!(output, "l {} {}", pos, class).unwrap();
                }
                Node::Decision { feature, edges } => {
                    write!(output, "n {} {}", pos, feature).unwrap();
                    for e in edges {
                        write!(output, " {}:{}", e.value, ids[&e.target]).unwrap();
                    }
                    writeln!(output).unwrap();
                }
            }
        }
        writeln!(output, "r {}", ids[&self.root()]).unwrap();

        output
    }

    /// Reads a diagram from a file in `.mdd` format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_mdd_string(&content)
    }

    /// Parses a diagram from `.mdd` format.
    pub fn from_mdd_string(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with("c ") && *line != "c");

        // Parse header
        let (line_no, header) = lines.next().ok_or_else(|| Error::parse(0, "missing header"))?;
        let mut parts = header.split_whitespace();
        let kind: ModelKind = parts.next().unwrap_or_default().parse()?;
        let nf: usize = parse_num(parts.next(), line_no, "number of features")?;
        let n_classes: usize = parse_num(parts.next(), line_no, "number of classes")?;
        // Every feature needs its own `f` record.
        let n_records = content.lines().count();
        if nf > n_records {
            return Err(Error::parse(
                line_no,
                format!("header declares {} features, file has {} lines", nf, n_records),
            ));
        }
        log::debug!("from_mdd_string: kind = {:?}, nf = {}, classes = {}", kind, nf, n_classes);

        let mut builder = MddBuilder::new(n_classes);
        let mut sizes: Vec<usize> = Vec::new();
        let mut order: Vec<Option<usize>> = vec![None; nf];
        let mut probs: Vec<Option<Vec<BigRational>>> = vec![None; nf];
        let mut ids: HashMap<u64, NodeId> = HashMap::new();
        let mut root = None;

        for (line_no, line) in lines {
            let mut parts = line.split_whitespace();
            let tag = parts.next().unwrap_or_default();
            match tag {
                "f" => {
                    let index: usize = parse_num(parts.next(), line_no, "feature index")?;
                    if index != sizes.len() || index >= nf {
                        return Err(Error::parse(line_no, format!("unexpected feature index {}", index)));
                    }
                    let name = parts.next().ok_or_else(|| Error::parse(line_no, "missing feature name"))?;
                    let domain_size: usize = parse_num(parts.next(), line_no, "domain size")?;
                    let level: usize = parse_num(parts.next(), line_no, "level")?;
                    if level >= nf || order[level].is_some() {
                        return Err(Error::parse(line_no, format!("invalid level {}", level)));
                    }
                    order[level] = Some(index);
                    builder.add_feature(name, domain_size);
                    sizes.push(domain_size);
                }
                "p" => {
                    let index: usize = parse_num(parts.next(), line_no, "feature index")?;
                    if index >= nf {
                        return Err(Error::parse(line_no, format!("unexpected feature index {}", index)));
                    }
                    let row = parts.map(|t| parse_probability(t, line_no)).collect::<Result<Vec<_>>>()?;
                    probs[index] = Some(row);
                }
                "l" => {
                    let id: u64 = parse_num(parts.next(), line_no, "node id")?;
                    let class: Class = parse_num(parts.next(), line_no, "class")?;
                    let node = builder.leaf(class);
                    if ids.insert(id, node).is_some() {
                        return Err(Error::parse(line_no, format!("duplicate node id {}", id)));
                    }
                }
                "n" => {
                    let id: u64 = parse_num(parts.next(), line_no, "node id")?;
                    let feature: usize = parse_num(parts.next(), line_no, "feature")?;
                    let mut edges: Vec<(Value, NodeId)> = Vec::new();
                    for token in parts {
                        let (value, child) = token
                            .split_once(':')
                            .ok_or_else(|| Error::parse(line_no, format!("invalid edge '{}'", token)))?;
                        let value: Value = parse_num(Some(value), line_no, "edge value")?;
                        let child: u64 = parse_num(Some(child), line_no, "edge target")?;
                        let child = *ids
                            .get(&child)
                            .ok_or_else(|| Error::parse(line_no, format!("unknown node id {}", child)))?;
                        edges.push((value, child));
                    }
                    let node = builder.node(feature, edges);
                    if ids.insert(id, node).is_some() {
                        return Err(Error::parse(line_no, format!("duplicate node id {}", id)));
                    }
                }
                "r" => {
                    let id: u64 = parse_num(parts.next(), line_no, "root id")?;
                    let node = *ids
                        .get(&id)
                        .ok_or_else(|| Error::parse(line_no, format!("unknown node id {}", id)))?;
                    root = Some(node);
                }
                _ => return Err(Error::parse(line_no, format!("unknown record '{}'", tag))),
            }
        }

        if sizes.len() != nf {
            return Err(Error::parse(0, format!("declared {} features, found {}", nf, sizes.len())));
        }
        let order: Vec<usize> = order.into_iter().flatten().collect();
        builder.order(order);

        if probs.iter().any(Option::is_some) {
            let rows: Vec<Vec<BigRational>> = probs
                .into_iter()
                .enumerate()
                .map(|(i, row)| row.ok_or_else(|| Error::parse(0, format!("missing distribution of feature {}", i))))
                .collect::<Result<_>>()?;
            builder.distribution(FeatureDistribution::from_rationals(&sizes, rows)?);
        }

        let root = root.ok_or_else(|| Error::parse(0, "missing root"))?;
        builder.build(root)
    }
}
