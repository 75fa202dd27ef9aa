//! The catalogue of diagnostic messages.
//!
//! Codes are grouped by the subject they report on (`CHAIN_*`, `COALESCENCE_*`,
//! `GROUP_*`, `LYPH_*`, `RESOURCE_*`, `REF_*`, `AUTO_GEN*`). Each code has a
//! fixed human message and a default [`Severity`].

use std::fmt;

use serde::{Serialize, Serializer};

use crate::diagnostics::Severity;

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCode {
    // =========================================================================
    // Info
    // =========================================================================
    ChainNumLevels,
    ChainSlice,
    GroupGenLyphAxis,
    NodeCloneInternal,
    ResourceIgnoreFields,
    ResourceNum,
    ResourceNumIdToStr,
    ResourceNumValToStr,

    // =========================================================================
    // Warnings
    // =========================================================================
    AutoGen,
    AutoGenExternal,
    ChainConflict,
    ChainConflict2,
    ChainConflict3,
    ChainHousingTemplate,
    ChainLevelCount,
    ChainMatDiff,
    ChainNoCoalescence,
    ChainNoConveyingLyph,
    ChainNoHousing,
    ChainNoHousingLayers,
    ChainNoHousingLyph,
    ChainSkipped,
    ChainUndefined,
    CoalescenceNoAxis,
    GraphLyphNoAxis,
    LyphSubtypeHasOwnLayers,
    ResourceClassUnknown,
    ResourceColorUnknown,
    ResourceDoubleRef,
    ResourceDuplicate,
    ResourceInvalidValue,
    ResourceNoId,

    // =========================================================================
    // Errors
    // =========================================================================
    ChainLevelError,
    ChainLyphTemplateMissing,
    CoalescenceNoLyph,
    CoalescenceSelf,
    GroupSelf,
    LyphConveyedTwice,
    LyphNoTemplateLayer,
    RefUndefined,
    ResourceNoAbstractClass,
}

impl LogCode {
    /// Returns the code as a string (e.g., "CHAIN_CONFLICT2").
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCode::ChainNumLevels => "CHAIN_NUM_LEVELS",
            LogCode::ChainSlice => "CHAIN_SLICE",
            LogCode::GroupGenLyphAxis => "GROUP_GEN_LYPH_AXIS",
            LogCode::NodeCloneInternal => "NODE_CLONE_INTERNAL",
            LogCode::ResourceIgnoreFields => "RESOURCE_IGNORE_FIELDS",
            LogCode::ResourceNum => "RESOURCE_NUM",
            LogCode::ResourceNumIdToStr => "RESOURCE_NUM_ID_TO_STR",
            LogCode::ResourceNumValToStr => "RESOURCE_NUM_VAL_TO_STR",
            LogCode::AutoGen => "AUTO_GEN",
            LogCode::AutoGenExternal => "AUTO_GEN_EXTERNAL",
            LogCode::ChainConflict => "CHAIN_CONFLICT",
            LogCode::ChainConflict2 => "CHAIN_CONFLICT2",
            LogCode::ChainConflict3 => "CHAIN_CONFLICT3",
            LogCode::ChainHousingTemplate => "CHAIN_HOUSING_TEMPLATE",
            LogCode::ChainLevelCount => "CHAIN_LEVEL_COUNT",
            LogCode::ChainMatDiff => "CHAIN_MAT_DIFF",
            LogCode::ChainNoCoalescence => "CHAIN_NO_COALESCENCE",
            LogCode::ChainNoConveyingLyph => "CHAIN_NO_CONVEYING_LYPH",
            LogCode::ChainNoHousing => "CHAIN_NO_HOUSING",
            LogCode::ChainNoHousingLayers => "CHAIN_NO_HOUSING_LAYERS",
            LogCode::ChainNoHousingLyph => "CHAIN_NO_HOUSING_LYPH",
            LogCode::ChainSkipped => "CHAIN_SKIPPED",
            LogCode::ChainUndefined => "CHAIN_UNDEFINED",
            LogCode::CoalescenceNoAxis => "COALESCENCE_NO_AXIS",
            LogCode::GraphLyphNoAxis => "GRAPH_LYPH_NO_AXIS",
            LogCode::LyphSubtypeHasOwnLayers => "LYPH_SUBTYPE_HAS_OWN_LAYERS",
            LogCode::ResourceClassUnknown => "RESOURCE_CLASS_UNKNOWN",
            LogCode::ResourceColorUnknown => "RESOURCE_COLOR_UNKNOWN",
            LogCode::ResourceDoubleRef => "RESOURCE_DOUBLE_REF",
            LogCode::ResourceDuplicate => "RESOURCE_DUPLICATE",
            LogCode::ResourceInvalidValue => "RESOURCE_INVALID_VALUE",
            LogCode::ResourceNoId => "RESOURCE_NO_ID",
            LogCode::ChainLevelError => "CHAIN_LEVEL_ERROR",
            LogCode::ChainLyphTemplateMissing => "CHAIN_LYPH_TEMPLATE_MISSING",
            LogCode::CoalescenceNoLyph => "COALESCENCE_NO_LYPH",
            LogCode::CoalescenceSelf => "COALESCENCE_SELF",
            LogCode::GroupSelf => "GROUP_SELF",
            LogCode::LyphConveyedTwice => "LYPH_CONVEYED_TWICE",
            LogCode::LyphNoTemplateLayer => "LYPH_NO_TEMPLATE_LAYER",
            LogCode::RefUndefined => "REF_UNDEFINED",
            LogCode::ResourceNoAbstractClass => "RESOURCE_NO_ABSTRACT_CLASS",
        }
    }

    /// Returns the human readable message for this code.
    pub fn message(&self) -> &'static str {
        match self {
            LogCode::ChainNumLevels => "Corrected number of levels in the chain",
            LogCode::ChainSlice => {
                "Sliced housing chain to match the number of lyphs in the housing range"
            }
            LogCode::GroupGenLyphAxis => "Generated links for lyphs without axes",
            LogCode::NodeCloneInternal => "Cloned node to join housed chain ends",
            LogCode::ResourceIgnoreFields => "Unknown parameter(s) may be ignored",
            LogCode::ResourceNum => "Number of resources in the generated model",
            LogCode::ResourceNumIdToStr => "Converted numeric ID to string",
            LogCode::ResourceNumValToStr => {
                "Converted numeric value of the given resource field to string"
            }
            LogCode::AutoGen => "Auto-created missing resources",
            LogCode::AutoGenExternal => "Auto-created missing external resources",
            LogCode::ChainConflict => {
                "Conflicting chain specification: both \"housingLyphs\" and \"housingChain\" are given. Proceeding with \"housingLyphs\""
            }
            LogCode::ChainConflict2 => {
                "Conflicting chain specification: both \"lyphs\" and \"levels\" arrays are given. Proceeding with \"lyphs\""
            }
            LogCode::ChainConflict3 => {
                "Conflicting specification of housing layer: the layer's \"bundlesChains\" property disagrees with the chain's \"housingLayers\" property"
            }
            LogCode::ChainHousingTemplate => "Housing lyph or its layer is a template",
            LogCode::ChainLevelCount => {
                "Inconsistent chain specification: more \"levels\" are given than \"numLevels\" allows. Proceeding with all given levels"
            }
            LogCode::ChainMatDiff => {
                "Incorrectly defined chain pattern - innermost layers do not convey the same material"
            }
            LogCode::ChainNoCoalescence => {
                "Skipped a coalescence between a housing lyph and a conveying lyph of the chain level it bundles: the conveying lyph is not defined"
            }
            LogCode::ChainNoConveyingLyph => "A chain link without conveying lyph found",
            LogCode::ChainNoHousing => "Incorrect chain specification: \"housingChain\" not found!",
            LogCode::ChainNoHousingLayers => "Failed to find all layers of the housing lyph",
            LogCode::ChainNoHousingLyph => "Failed to find chain level housing lyph",
            LogCode::ChainSkipped => {
                "Skipped faulty chain template. A correct chain template must have \"numLevels\" set to a positive number, or a non-empty list of \"lyphs\", \"levels\" or \"housingLyphs\", or a \"housingChain\" reference"
            }
            LogCode::ChainUndefined => "Cannot expand undefined chain template",
            LogCode::CoalescenceNoAxis => "A coalescing lyph is missing an axis",
            LogCode::GraphLyphNoAxis => {
                "Failed to compute axis length for an internal lyph: axis undefined"
            }
            LogCode::LyphSubtypeHasOwnLayers => {
                "Subtype lyph already has layers, conflicts with generated layer definitions possible"
            }
            LogCode::ResourceClassUnknown => "Cannot create a relationship: unknown resource class",
            LogCode::ResourceColorUnknown => "Unrecognized color scheme",
            LogCode::ResourceDoubleRef => {
                "Resource property should not refer to two distinct resources"
            }
            LogCode::ResourceDuplicate => "Duplicate resource definition",
            LogCode::ResourceInvalidValue => {
                "Invalid value of the given resource field, the value was ignored"
            }
            LogCode::ResourceNoId => "Resource ID is not a string: generated name can be affected",
            LogCode::ChainLevelError => "A mismatch between link ends found at level",
            LogCode::ChainLyphTemplateMissing => {
                "Failed to find the lyph template definition in the parent group"
            }
            LogCode::CoalescenceNoLyph => "Unable to access lyph for coalescence definition",
            LogCode::CoalescenceSelf => "A lyph coalesces with itself or its layers",
            LogCode::GroupSelf => "The model contains self-references or cyclic group dependencies",
            LogCode::LyphConveyedTwice => {
                "It is not allowed to use the same lyph as conveying lyph for multiple processes (links)"
            }
            LogCode::LyphNoTemplateLayer => "Template layer object not found",
            LogCode::RefUndefined => "Remaining references to undefined resources",
            LogCode::ResourceNoAbstractClass => {
                "An abstract relationship field expects a reference to an existing resource or 'class' field in its value definition"
            }
        }
    }

    /// Returns the severity entries with this code are logged at by default.
    pub fn severity(&self) -> Severity {
        match self {
            LogCode::ChainNumLevels
            | LogCode::ChainSlice
            | LogCode::GroupGenLyphAxis
            | LogCode::NodeCloneInternal
            | LogCode::ResourceIgnoreFields
            | LogCode::ResourceNum
            | LogCode::ResourceNumIdToStr
            | LogCode::ResourceNumValToStr => Severity::Info,
            LogCode::AutoGen
            | LogCode::AutoGenExternal
            | LogCode::ChainConflict
            | LogCode::ChainConflict2
            | LogCode::ChainConflict3
            | LogCode::ChainHousingTemplate
            | LogCode::ChainLevelCount
            | LogCode::ChainMatDiff
            | LogCode::ChainNoCoalescence
            | LogCode::ChainNoConveyingLyph
            | LogCode::ChainNoHousing
            | LogCode::ChainNoHousingLayers
            | LogCode::ChainNoHousingLyph
            | LogCode::ChainSkipped
            | LogCode::ChainUndefined
            | LogCode::CoalescenceNoAxis
            | LogCode::GraphLyphNoAxis
            | LogCode::LyphSubtypeHasOwnLayers
            | LogCode::ResourceClassUnknown
            | LogCode::ResourceColorUnknown
            | LogCode::ResourceDoubleRef
            | LogCode::ResourceDuplicate
            | LogCode::ResourceInvalidValue
            | LogCode::ResourceNoId => Severity::Warning,
            LogCode::ChainLevelError
            | LogCode::ChainLyphTemplateMissing
            | LogCode::CoalescenceNoLyph
            | LogCode::CoalescenceSelf
            | LogCode::GroupSelf
            | LogCode::LyphConveyedTwice
            | LogCode::LyphNoTemplateLayer
            | LogCode::RefUndefined
            | LogCode::ResourceNoAbstractClass => Severity::Error,
        }
    }
}

impl fmt::Display for LogCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for LogCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_code_display() {
        assert_eq!(LogCode::ChainConflict2.to_string(), "CHAIN_CONFLICT2");
        assert_eq!(LogCode::RefUndefined.as_str(), "REF_UNDEFINED");
    }

    #[test]
    fn test_log_code_message() {
        assert_eq!(
            LogCode::ChainConflict2.message(),
            "Conflicting chain specification: both \"lyphs\" and \"levels\" arrays are given. Proceeding with \"lyphs\""
        );
        assert_eq!(
            LogCode::CoalescenceSelf.message(),
            "A lyph coalesces with itself or its layers"
        );
    }

    #[test]
    fn test_log_code_severity() {
        assert_eq!(LogCode::ChainNumLevels.severity(), Severity::Info);
        assert_eq!(LogCode::ChainConflict2.severity(), Severity::Warning);
        assert_eq!(LogCode::LyphConveyedTwice.severity(), Severity::Error);
    }
}
