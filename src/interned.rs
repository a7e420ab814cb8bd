/// Interned message id.
#[salsa::interned(debug)]
pub struct MessageId {
    #[returns(ref)]
    pub text: String,
}
