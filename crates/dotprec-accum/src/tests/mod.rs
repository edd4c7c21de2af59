mod proptest_soundness;
