#![allow(non_camel_case_types, non_snake_case)]

//! Raw MPICH bindings for the calls `dwmpi::MpiComm` makes.

use std::os::raw::*;

pub type MpiComm = c_int;
pub type MpiDatatype = c_int;

pub const MPI_SUCCESS: c_int = 0;

pub static MPI_COMM_WORLD: MpiComm = 0x44000000;

pub static MPI_BYTE: MpiDatatype = 0x4c00010d;
pub static MPI_UNSIGNED_LONG_LONG: MpiDatatype = 0x4c000819;

#[link(name = "mpich", kind = "dylib")]
extern "C" {
    pub fn MPI_Init(argc: *const c_int, argv: *const c_char) -> c_int;

    pub fn MPI_Initialized(flag: *mut c_int) -> c_int;

    pub fn MPI_Finalize() -> c_int;

    pub fn MPI_Comm_rank(comm: MpiComm, rank: *mut c_int) -> c_int;

    pub fn MPI_Comm_size(comm: MpiComm, size: *mut c_int) -> c_int;

    pub fn MPI_Barrier(comm: MpiComm) -> c_int;

    pub fn MPI_Bcast(
        buf: *mut c_void,
        count: c_int,
        datatype: MpiDatatype,
        root: c_int,
        comm: MpiComm,
    ) -> c_int;
}
