//! Embedded contract bytecode used by the deployment examples and tests.

/// Compiled "Hello, world!" contract: a `greet()` view returning the
/// greeting and a `kill()` that self-destructs when called by the deployer.
pub const HELLO_WORLD_BYTECODE_HEX: &str = "608060405234801561001057600080fd5b50336000806101000a81548173ffffffffffffffffffffffffffffffffffffffff021916908373ffffffffffffffffffffffffffffffffffffffff1602179055506101cb806100606000396000f3fe608060405260043610610046576000357c01000000000000000000000000000000000000000000000000000000009004806341c0e1b51461004b578063cfae321714610062575b600080fd5b34801561005757600080fd5b506100606100f2565b005b34801561006e57600080fd5b50610077610162565b6040518080602001828103825283818151815260200191508051906020019080838360005b838110156100b757808201518184015260208101905061009c565b50505050905090810190601f1680156100e45780820380516001836020036101000a031916815260200191505b509250505060405180910390f35b6000809054906101000a900473ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff163373ffffffffffffffffffffffffffffffffffffffff161415610160573373ffffffffffffffffffffffffffffffffffffffff16ff5b565b60606040805190810160405280600d81526020017f48656c6c6f2c20776f726c64210000000000000000000000000000000000000081525090509056fea165627a7a72305820ae96fb3af7cde9c0abfe365272441894ab717f816f07f41f07b1cbede54e256e0029";

/// The embedded bytecode, decoded.
pub fn hello_world_bytecode() -> Vec<u8> {
	hex::decode(HELLO_WORLD_BYTECODE_HEX).expect("embedded bytecode is valid hex")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bytecode_decodes() {
		let bytecode = hello_world_bytecode();
		assert_eq!(bytecode.len() * 2, HELLO_WORLD_BYTECODE_HEX.len());
		// EVM deployment code starts with PUSH1 0x80 PUSH1 0x40.
		assert_eq!(&bytecode[..4], &[0x60, 0x80, 0x60, 0x40]);
	}
}
