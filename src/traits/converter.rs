/// Bidirectional mapping between the value a control stores and the value it
/// is rendered or edited as.
///
/// `from_external` may be lossy (text that is not a number), `to_external`
/// should not be.
pub trait Converter {
    /// Value stored by the control.
    type Internal;
    /// Value exchanged with the outside (usually text).
    type External;

    fn from_external(&self, external: Self::External) -> Self::Internal;

    fn to_external(&self, internal: Self::Internal) -> Self::External;
}

impl<C: Converter + ?Sized> Converter for &C {
    type Internal = C::Internal;
    type External = C::External;

    fn from_external(&self, external: Self::External) -> Self::Internal {
        (**self).from_external(external)
    }

    fn to_external(&self, internal: Self::Internal) -> Self::External {
        (**self).to_external(internal)
    }
}
