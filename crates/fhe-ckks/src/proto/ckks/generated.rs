#![allow(missing_docs)]
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Parameters {
    #[prost(uint32, tag = "1")]
    pub scheme: u32,
    #[prost(uint32, tag = "2")]
    pub degree: u32,
    #[prost(uint64, repeated, tag = "3")]
    pub moduli: ::prost::alloc::vec::Vec<u64>,
    #[prost(uint32, tag = "4")]
    pub variance: u32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ciphertext {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub c: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint32, tag = "2")]
    pub level: u32,
    #[prost(double, tag = "3")]
    pub scale: f64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SecretKey {
    #[prost(sint64, repeated, tag = "1")]
    pub coeffs: ::prost::alloc::vec::Vec<i64>,
    #[prost(bytes = "vec", tag = "2")]
    pub parms_id: ::prost::alloc::vec::Vec<u8>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublicKey {
    #[prost(message, optional, tag = "1")]
    pub c: ::core::option::Option<Ciphertext>,
    #[prost(bytes = "vec", tag = "2")]
    pub parms_id: ::prost::alloc::vec::Vec<u8>,
}
