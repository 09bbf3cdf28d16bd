use std::collections::HashMap;

use tracing::debug;

use crate::analysis::threshold::{ComparisonCount, CountTable};
use crate::analysis::tidy::TidyTable;
use crate::error::{StatsError, StatsResult};

/// One display column: where its values come from in the tidy table and how
/// it is labelled.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutColumn {
    pub group1: &'static str,
    pub group2: &'static str,
    pub comparison: &'static str,
    pub treatment: &'static str,
}

impl LayoutColumn {
    const fn new(
        group1: &'static str,
        group2: &'static str,
        comparison: &'static str,
        treatment: &'static str,
    ) -> Self {
        Self {
            group1,
            group2,
            comparison,
            treatment,
        }
    }

    pub fn label(&self) -> String {
        format!("{}_{}", self.comparison, self.treatment)
    }
}

/// Ordered set of display columns for one family of comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayout {
    pub name: &'static str,
    pub columns: Vec<LayoutColumn>,
}

impl HeatmapLayout {
    /// Each cell line's TGFb response, controls first.
    pub fn within() -> Self {
        Self {
            name: "within",
            columns: vec![
                LayoutColumn::new("within_neonatal", "ctrl_perc", "neonatal", "control"),
                LayoutColumn::new("within_adult", "ctrl_perc", "adult", "control"),
                LayoutColumn::new("within_senescent", "ctrl_perc", "senescent", "control"),
                LayoutColumn::new("within_neonatal", "tgfb_perc", "neonatal", "tgf"),
                LayoutColumn::new("within_adult", "tgfb_perc", "adult", "tgf"),
                LayoutColumn::new("within_senescent", "tgfb_perc", "senescent", "tgf"),
            ],
        }
    }

    /// Adult and senescent lines against neonatal, controls first.
    pub fn between() -> Self {
        Self {
            name: "between",
            columns: vec![
                LayoutColumn::new("between_control", "ad_perc", "adult", "control"),
                LayoutColumn::new("between_control", "sen_perc", "senescent", "control"),
                LayoutColumn::new("between_tgfb", "ad_perc", "adult", "tgfb"),
                LayoutColumn::new("between_tgfb", "sen_perc", "senescent", "tgfb"),
            ],
        }
    }

    /// Distinct `group1` labels this layout reads, in column order.
    pub fn groups(&self) -> Vec<&'static str> {
        let mut groups: Vec<&'static str> = Vec::new();
        for c in &self.columns {
            if !groups.contains(&c.group1) {
                groups.push(c.group1);
            }
        }
        groups
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(LayoutColumn::label).collect()
    }

    pub fn count_file_name(&self, threshold: f64) -> String {
        format!("{}_count_greater_than_{}_percent.csv", self.name, threshold)
    }

    /// Gene x column matrix of percentages for the layout's groups.
    ///
    /// Genes follow the tidy table's order. A gene with no value in any of the
    /// layout's columns gets no row. A (group1, group2) pair with no rows at
    /// all means the source table lacked that column.
    pub fn pivot(&self, tidy: &TidyTable) -> StatsResult<PivotMatrix> {
        let subset = tidy.filter_groups(&self.groups());

        let mut cells: HashMap<(&str, &str, &str), Option<f64>> = HashMap::new();
        for row in subset.rows() {
            cells.insert(
                (row.gene.as_str(), row.group1.as_str(), row.group2.as_str()),
                row.percentage,
            );
        }

        for c in &self.columns {
            let present = subset
                .rows()
                .iter()
                .any(|r| r.group1 == c.group1 && r.group2 == c.group2);
            if !present {
                return Err(StatsError::MissingColumn {
                    table: c.group1.to_string(),
                    column: c.group2.to_string(),
                });
            }
        }

        let (genes, values): (Vec<String>, Vec<Vec<Option<f64>>>) = subset
            .genes()
            .into_iter()
            .map(|gene| {
                let row: Vec<Option<f64>> = self
                    .columns
                    .iter()
                    .map(|c| cells.get(&(gene, c.group1, c.group2)).copied().flatten())
                    .collect();
                (gene.to_string(), row)
            })
            .filter(|(_, row)| row.iter().any(Option::is_some))
            .unzip();

        debug!("{} pivot: {} genes x {} columns", self.name, genes.len(), self.columns.len());

        Ok(PivotMatrix {
            genes,
            columns: self.labels(),
            values,
        })
    }

    /// Relabels threshold counts as (comparison, treatment), in layout order.
    pub fn comparison_counts(&self, counts: &CountTable) -> StatsResult<Vec<ComparisonCount>> {
        self.columns
            .iter()
            .map(|c| {
                let count = counts.get(c.group1, c.group2).ok_or_else(|| StatsError::MissingColumn {
                    table: c.group1.to_string(),
                    column: c.group2.to_string(),
                })?;
                Ok(ComparisonCount {
                    comparison: c.comparison.to_string(),
                    treatment: c.treatment.to_string(),
                    count,
                })
            })
            .collect()
    }
}

/// Rows are genes, columns are layout labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    pub genes: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl PivotMatrix {
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::threshold::count_above;
    use crate::analysis::tidy::build_tidy_table;
    use crate::models::{GeneResultTable, PercentColumn};

    fn between_tables() -> (GeneResultTable, GeneResultTable) {
        let genes = vec!["GeneA".to_string(), "GeneB".to_string()];
        let control = GeneResultTable::new(
            "between_control",
            genes.clone(),
            vec![
                PercentColumn::new("sen_perc", vec![Some(70.0), Some(55.0)]),
                PercentColumn::new("ad_perc", vec![Some(40.0), Some(90.0)]),
            ],
        )
        .unwrap();
        let tgfb = GeneResultTable::new(
            "between_tgfb",
            genes,
            vec![
                PercentColumn::new("sen_perc", vec![Some(61.0), None]),
                PercentColumn::new("ad_perc", vec![Some(5.0), Some(60.0)]),
            ],
        )
        .unwrap();
        (control, tgfb)
    }

    #[test]
    fn between_pivot_follows_layout_order() {
        let (control, tgfb) = between_tables();
        let tidy = build_tidy_table(&[("between_control", &control), ("between_tgfb", &tgfb)]).unwrap();

        let matrix = HeatmapLayout::between().pivot(&tidy).unwrap();

        assert_eq!(
            matrix.columns,
            vec!["adult_control", "senescent_control", "adult_tgfb", "senescent_tgfb"]
        );
        assert_eq!(matrix.genes, vec!["GeneA", "GeneB"]);
        assert_eq!(matrix.values[0], vec![Some(40.0), Some(70.0), Some(5.0), Some(61.0)]);
        assert_eq!(matrix.values[1], vec![Some(90.0), Some(55.0), Some(60.0), None]);
        assert_eq!(matrix.value_range(), Some((5.0, 90.0)));
    }

    #[test]
    fn pivot_ignores_groups_outside_the_layout() {
        let (control, tgfb) = between_tables();
        let within = GeneResultTable::new(
            "within_adult",
            vec!["GeneZ".to_string()],
            vec![PercentColumn::new("ctrl_perc", vec![Some(1.0)])],
        )
        .unwrap();
        let tidy = build_tidy_table(&[
            ("between_control", &control),
            ("between_tgfb", &tgfb),
            ("within_adult", &within),
        ])
        .unwrap();

        let matrix = HeatmapLayout::between().pivot(&tidy).unwrap();
        // GeneZ only has within values
        assert_eq!(matrix.genes, vec!["GeneA", "GeneB"]);
        assert_eq!(matrix.values.len(), 2);
    }

    #[test]
    fn pivot_drops_genes_without_layout_values() {
        let (control, tgfb) = between_tables();
        let control_nan = GeneResultTable::new(
            "between_control",
            vec!["GeneA".into(), "GeneB".into(), "GeneC".into()],
            control
                .columns()
                .iter()
                .map(|c| {
                    let mut values = c.values.clone();
                    values.push(None);
                    PercentColumn::new(c.name.as_str(), values)
                })
                .collect(),
        )
        .unwrap();
        let tidy = build_tidy_table(&[("between_control", &control_nan), ("between_tgfb", &tgfb)]).unwrap();

        // GeneC is a tidy row with no percentage, but not a heatmap row
        assert!(tidy.genes().contains(&"GeneC"));
        let matrix = HeatmapLayout::between().pivot(&tidy).unwrap();
        assert_eq!(matrix.genes, vec!["GeneA", "GeneB"]);
    }

    #[test]
    fn within_layout_needs_its_columns() {
        let (control, tgfb) = between_tables();
        let tidy = build_tidy_table(&[("between_control", &control), ("between_tgfb", &tgfb)]).unwrap();

        assert!(matches!(
            HeatmapLayout::within().pivot(&tidy),
            Err(StatsError::MissingColumn { .. })
        ));
    }

    #[test]
    fn counts_are_relabelled_by_comparison_and_treatment() {
        let (control, tgfb) = between_tables();
        let tidy = build_tidy_table(&[("between_control", &control), ("between_tgfb", &tgfb)]).unwrap();
        let layout = HeatmapLayout::between();

        let counts = layout.comparison_counts(&count_above(&tidy, 60.0)).unwrap();
        let flat: Vec<(&str, &str, usize)> = counts
            .iter()
            .map(|c| (c.comparison.as_str(), c.treatment.as_str(), c.count))
            .collect();

        assert_eq!(
            flat,
            vec![
                ("adult", "control", 1),
                ("senescent", "control", 1),
                ("adult", "tgfb", 0),
                ("senescent", "tgfb", 1),
            ]
        );
        assert_eq!(
            layout.count_file_name(60.0),
            "between_count_greater_than_60_percent.csv"
        );
    }

    #[test]
    fn within_groups_are_listed_once() {
        assert_eq!(
            HeatmapLayout::within().groups(),
            vec!["within_neonatal", "within_adult", "within_senescent"]
        );
    }
}
