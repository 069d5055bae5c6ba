use serde::Serialize;

/// One insertable formula. Selecting an entry inserts its markup at the
/// widget's cursor; the catalog itself is never mutated.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FormulaEntry {
  pub(crate) id: &'static str,
  pub(crate) label: &'static str,
  pub(crate) latex: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FormulaCategory {
  pub(crate) title: &'static str,
  pub(crate) formulas: Vec<FormulaEntry>,
}

fn entry(id: &'static str, label: &'static str, latex: &'static str) -> FormulaEntry {
  FormulaEntry { id, label, latex }
}

/// The formula menu, grouped by school level.
pub(crate) fn formula_catalog() -> Vec<FormulaCategory> {
  vec![
    FormulaCategory {
      title: "İlkokul Formülleri",
      formulas: vec![
        entry("primary-perimeter-square", "Kare Çevre", r"\text{Çevre}=4a"),
        entry("primary-area-square", "Kare Alan", r"\text{Alan}=a^2"),
        entry(
          "primary-perimeter-rectangle",
          "Dikdörtgen Çevre",
          r"\text{Çevre}=2(a+b)",
        ),
        entry(
          "primary-area-rectangle",
          "Dikdörtgen Alan",
          r"\text{Alan}=a\times b",
        ),
      ],
    },
    FormulaCategory {
      title: "Ortaokul Formülleri",
      formulas: vec![
        entry("middle-circle-area", "Daire Alan", r"\text{Alan}=\pi r^2"),
        entry(
          "middle-circle-perimeter",
          "Daire Çevre",
          r"\text{Çevre}=2\pi r",
        ),
        entry("middle-pythagoras", "Pisagor Teoremi", r"a^2+b^2=c^2"),
        entry(
          "middle-triangle-area",
          "Üçgen Alanı",
          r"\text{Alan}=\frac{h\times t}{2}",
        ),
      ],
    },
    FormulaCategory {
      title: "Lise Formülleri",
      formulas: vec![
        entry(
          "high-quadratic",
          "İkinci Derece Denklem",
          r"x=\frac{-b\pm\sqrt{b^2-4ac}}{2a}",
        ),
        entry(
          "high-arithmetic-sequence",
          "Aritmetik Dizi",
          r"a_n=a_1+(n-1)d",
        ),
        entry(
          "high-geometric-sequence",
          "Geometrik Dizi",
          r"a_n=a_1\times r^{n-1}",
        ),
        entry(
          "high-derivative",
          "Türev (Kuvvet Kuralı)",
          r"\frac{d}{dx}x^n=nx^{n-1}",
        ),
        entry(
          "high-integral",
          "İntegral (Kuvvet Kuralı)",
          r"\int x^n dx=\frac{x^{n+1}}{n+1}+C",
        ),
      ],
    },
  ]
}
