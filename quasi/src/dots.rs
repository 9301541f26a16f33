use crate::{
    Quote, Symbol,
    format::{expr_text, truncate_text},
};

/// One captured dots argument.
#[derive(Debug, Clone, PartialEq)]
pub struct DotsElement {
    pub name: Option<Symbol>,
    pub quote: Quote,
}

impl DotsElement {
    pub fn new(name: Option<Symbol>, quote: Quote) -> Self {
        Self { name, quote }
    }

    /// Whether the element carries a usable name. An empty name counts
    /// as no name.
    #[inline]
    pub fn is_named(&self) -> bool {
        self.name.as_ref().is_some_and(|name| !name.is_empty())
    }
}

/// The captured variadic arguments of a call, in call-site order.
///
/// Each element keeps its own scope. Names are optional and need not be
/// unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dots {
    elements: Vec<DotsElement>,
}

impl Dots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: Option<Symbol>, quote: Quote) {
        self.elements.push(DotsElement::new(name, quote));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DotsElement> {
        self.elements.iter()
    }

    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.elements.iter().map(|element| &element.quote)
    }

    pub fn names(&self) -> Vec<Option<&Symbol>> {
        self.elements
            .iter()
            .map(|element| element.name.as_ref())
            .collect()
    }

    /// The first element called `name`.
    pub fn get(&self, name: &str) -> Option<&Quote> {
        self.elements
            .iter()
            .find(|element| element.name.as_ref().is_some_and(|n| n == name))
            .map(|element| &element.quote)
    }

    /// Names every unnamed element after its expression, rendered on one
    /// line and cut to `width` characters. Named elements are untouched.
    pub fn auto_name(self, width: usize) -> Self {
        self.elements
            .into_iter()
            .map(|element| {
                if element.is_named() {
                    return element;
                }
                let text = expr_text(element.quote.expr());
                let text = truncate_text(&text, width);
                DotsElement::new(Some(Symbol::from_text(&text)), element.quote)
            })
            .collect()
    }
}

impl From<Vec<DotsElement>> for Dots {
    fn from(elements: Vec<DotsElement>) -> Self {
        Self { elements }
    }
}

impl FromIterator<DotsElement> for Dots {
    fn from_iter<T: IntoIterator<Item = DotsElement>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dots {
    type Item = DotsElement;
    type IntoIter = std::vec::IntoIter<DotsElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dots {
    type Item = &'a DotsElement;
    type IntoIter = std::slice::Iter<'a, DotsElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
