//! Element to template binding.

use crate::constants::TEMPLATE_ID_ATTR;
use crate::markup::MarkupDocument;
use crate::models::ElementRecord;

/// Bind each element to the first template in `structure` whose `id` equals
/// the element name. Elements without a match are left untouched.
pub fn bind_templates(elements: &mut [ElementRecord], structure: &MarkupDocument) {
    for element in elements {
        if let Some(index) = structure
            .templates
            .iter()
            .position(|template| template.attr(TEMPLATE_ID_ATTR) == Some(element.is.as_str()))
        {
            element.template = Some(index);
        }
    }
}
