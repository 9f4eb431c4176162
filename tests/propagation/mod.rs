mod shaped;
